//! Cross-process locking of a project's forest.
//!
//! Every `evo` invocation loads the snapshot, maybe mutates it, and writes
//! it back. Writers hold `.evograph/forest.lock` exclusively for the whole
//! load-mutate-save cycle; readers share it so they never see a snapshot
//! that is halfway through a rename.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::config::{ProjectConfig, ProjectPaths};
use crate::error::ErrorCode;

const FIRST_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum LockError {
    /// Another process kept the lock past the configured timeout.
    #[error("forest lock {shown} still held by another process after {waited:?}", shown = .path.display())]
    Contended { path: PathBuf, waited: Duration },

    /// The lock file could not be created or locked.
    #[error("cannot lock forest: {0}")]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Contended { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::SnapshotWriteFailed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// What the holder intends to do with the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Queries; any number of readers at once.
    Read,
    /// Mutations; excludes every other holder.
    Write,
}

/// Held advisory lock on a project's forest. Released on drop.
#[derive(Debug)]
#[must_use = "the forest is unlocked as soon as the guard is dropped"]
pub struct ForestLock {
    file: File,
    access: Access,
}

impl ForestLock {
    /// Lock the forest of an opened project with its configured timeout.
    ///
    /// # Errors
    ///
    /// See [`ForestLock::acquire`].
    pub fn for_project(
        paths: &ProjectPaths,
        config: &ProjectConfig,
        access: Access,
    ) -> Result<Self, LockError> {
        Self::acquire(&paths.lock, access, config.lock_timeout())
    }

    /// Lock `path`, creating it if needed, and retry with backoff until
    /// `timeout` has passed.
    ///
    /// # Errors
    ///
    /// [`LockError::Contended`] when the lock is still held after
    /// `timeout`, [`LockError::Io`] for any other filesystem failure.
    pub fn acquire(path: &Path, access: Access, timeout: Duration) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        let mut backoff = FIRST_BACKOFF;
        loop {
            let attempt = match access {
                Access::Read => FileExt::try_lock_shared(&file),
                Access::Write => FileExt::try_lock_exclusive(&file),
            };
            match attempt {
                Ok(()) => {
                    debug!(path = %path.display(), ?access, "locked forest");
                    return Ok(Self { file, access });
                }
                Err(err) if !is_contended(&err) => return Err(err.into()),
                Err(_) => {}
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(LockError::Contended {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(backoff.min(timeout - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        self.access
    }
}

impl Drop for ForestLock {
    fn drop(&mut self) {
        // Closing the file releases the lock anyway.
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(30);

    fn project(root: &Path) -> (ProjectPaths, ProjectConfig) {
        let config = ProjectConfig::default();
        (ProjectPaths::new(&root.join(".evograph"), &config), config)
    }

    #[test]
    fn for_project_creates_the_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, config) = project(dir.path());

        let lock = ForestLock::for_project(&paths, &config, Access::Write).unwrap();
        assert_eq!(lock.access(), Access::Write);
        assert!(paths.lock.exists());
    }

    #[test]
    fn readers_share_the_forest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.lock");

        let _first = ForestLock::acquire(&path, Access::Read, SHORT).unwrap();
        let second = ForestLock::acquire(&path, Access::Read, SHORT);
        assert!(second.is_ok());
    }

    #[test]
    fn writer_excludes_readers_and_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.lock");
        let _writer = ForestLock::acquire(&path, Access::Write, SHORT).unwrap();

        for access in [Access::Read, Access::Write] {
            let started = Instant::now();
            let err = ForestLock::acquire(&path, access, SHORT).unwrap_err();
            assert!(started.elapsed() >= SHORT);
            assert!(matches!(err, LockError::Contended { path: ref p, .. } if *p == path));
            assert_eq!(err.code(), ErrorCode::LockContention);
        }
    }

    #[test]
    fn reader_blocks_a_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.lock");
        let _reader = ForestLock::acquire(&path, Access::Read, SHORT).unwrap();

        let err = ForestLock::acquire(&path, Access::Write, SHORT).unwrap_err();
        assert!(matches!(err, LockError::Contended { .. }));
    }

    #[test]
    fn dropping_the_guard_unlocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.lock");

        drop(ForestLock::acquire(&path, Access::Write, SHORT).unwrap());
        assert!(ForestLock::acquire(&path, Access::Write, SHORT).is_ok());
    }

    #[test]
    fn contention_message_names_the_lock_file() {
        let err = LockError::Contended {
            path: PathBuf::from(".evograph/forest.lock"),
            waited: Duration::from_millis(5000),
        };
        let message = err.to_string();
        assert!(message.contains(".evograph/forest.lock"));
        assert!(message.contains("5s"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn io_failures_map_to_write_failure() {
        let err = LockError::from(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        assert_eq!(err.code(), ErrorCode::SnapshotWriteFailed);
        assert!(err.to_string().contains("read-only"));
    }
}
