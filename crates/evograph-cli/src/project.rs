//! Locate the project, load its config, and run commands against the
//! persisted forest under the right advisory lock.

use anyhow::Result;
use evograph_core::AncestryStore;
use evograph_core::config::{ProjectConfig, ProjectPaths, discover_project_dir, load_project_config};
use evograph_core::error::ErrorCode;
use evograph_core::lock::{Access, ForestLock};
use evograph_core::snapshot::{load_forest, save_forest};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Project-level failures that map onto a stable error code. The
/// underlying failure, when there is one, stays reachable through
/// `source()` so typed causes such as a snapshot cycle survive.
#[derive(Debug)]
pub struct ProjectError {
    code: ErrorCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl ProjectError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    fn caused_by(code: ErrorCode, message: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(code, message)
        }
    }

    pub const fn code(&self) -> ErrorCode {
        self.code
    }
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// An initialized `.evograph/` directory and its configuration.
#[derive(Debug)]
pub struct Project {
    pub paths: ProjectPaths,
    pub config: ProjectConfig,
}

impl Project {
    /// Find the nearest `.evograph/` at or above `start` and load its config.
    pub fn open(start: &Path) -> Result<Self> {
        let dir = discover_project_dir(start).ok_or_else(|| {
            ProjectError::new(
                ErrorCode::NotInitialized,
                format!("no .evograph/ directory found at or above {}", start.display()),
            )
        })?;
        let config = load_project_config(&dir).map_err(|err| {
            ProjectError::caused_by(ErrorCode::ConfigParseError, "invalid project config", err)
        })?;
        let paths = ProjectPaths::new(&dir, &config);
        debug!(dir = %paths.dir.display(), "opened project");
        Ok(Self { paths, config })
    }

    fn load_store(&self) -> Result<AncestryStore> {
        let forest =
            load_forest(&self.paths.snapshot, self.config.name_limits()).map_err(|err| {
                ProjectError::caused_by(ErrorCode::CorruptSnapshot, "cannot load forest", err)
            })?;
        Ok(AncestryStore::from_forest(forest).with_lca_options(self.config.lca_options()))
    }

    /// Run a read-only command under a shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&AncestryStore) -> Result<T>) -> Result<T> {
        let _lock = ForestLock::for_project(&self.paths, &self.config, Access::Read)?;
        let store = self.load_store()?;
        f(&store)
    }

    /// Run a mutating command under an exclusive lock and persist the
    /// result. Nothing is written if `f` fails.
    pub fn write<T>(&self, f: impl FnOnce(&AncestryStore) -> Result<T>) -> Result<T> {
        let _lock = ForestLock::for_project(&self.paths, &self.config, Access::Write)?;
        let store = self.load_store()?;
        let value = f(&store)?;
        save_forest(&self.paths.snapshot, &store.into_forest()).map_err(|err| {
            ProjectError::caused_by(ErrorCode::SnapshotWriteFailed, "cannot save forest", err)
        })?;
        Ok(value)
    }
}
