//! JSON snapshot of the forest on disk.
//!
//! The snapshot stores the id counter next to the nodes so ids stay unique
//! across runs. Loading goes through [`Forest::from_parts`], which re-checks
//! every invariant; a snapshot edited into a cycle is rejected rather than
//! loaded.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AnimalNode, NameLimits};
use crate::store::Forest;

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    last_id: u64,
    #[serde(default)]
    animals: Vec<AnimalNode>,
}

/// Load the forest at `path`. A missing file is an empty forest.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, has an unknown version, or
/// violates a forest invariant.
pub fn load_forest(path: &Path, limits: NameLimits) -> Result<Forest> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot yet; starting empty");
        return Ok(Forest::with_limits(limits));
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if file.version != SNAPSHOT_VERSION {
        bail!(
            "unsupported snapshot version {} in {} (expected {SNAPSHOT_VERSION})",
            file.version,
            path.display()
        );
    }

    let count = file.animals.len();
    let forest = Forest::from_parts(file.last_id, file.animals, limits)
        .with_context(|| format!("snapshot {} is inconsistent", path.display()))?;
    debug!(path = %path.display(), animals = count, "loaded snapshot");
    Ok(forest)
}

/// Persist `forest` to `path` via a temp file and rename.
///
/// # Errors
///
/// Fails if the directory or file cannot be written.
pub fn save_forest(path: &Path, forest: &Forest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        last_id: forest.last_id(),
        animals: forest.iter().cloned().collect(),
    };
    let body = serde_json::to_vec_pretty(&file).context("failed to serialize forest snapshot")?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, body)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to atomically move {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    debug!(path = %path.display(), animals = file.animals.len(), "saved snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AncestryError;
    use crate::model::{AnimalId, NewAnimal};

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let forest = load_forest(&dir.path().join("forest.json"), NameLimits::default())
            .expect("load");
        assert!(forest.is_empty());
        assert_eq!(forest.last_id(), 0);
    }

    #[test]
    fn save_then_load_preserves_nodes_and_counter() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/forest.json");

        let mut forest = Forest::new();
        let mammalia = forest.insert(NewAnimal::named("Mammalia"), None).expect("insert");
        let lion = forest
            .insert(
                NewAnimal::named("Lion").with_scientific_name("Panthera leo"),
                Some(mammalia.id),
            )
            .expect("insert");
        let doomed = forest.insert(NewAnimal::named("Aves"), None).expect("insert");
        forest.remove(doomed.id).expect("remove");

        save_forest(&path, &forest).expect("save");
        assert!(!path.with_extension("json.tmp").exists());

        let mut loaded = load_forest(&path, NameLimits::default()).expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(lion.id), Some(&lion));
        assert_eq!(loaded.last_id(), 3);

        let next = loaded.insert(NewAnimal::named("Reptilia"), None).expect("insert");
        assert_eq!(next.id, AnimalId::new(4));
    }

    #[test]
    fn cyclic_snapshot_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("forest.json");
        fs::write(
            &path,
            r#"{
  "version": 1,
  "last_id": 2,
  "animals": [
    { "id": 1, "name": "A", "ancestor_id": 2 },
    { "id": 2, "name": "B", "ancestor_id": 1 }
  ]
}"#,
        )
        .expect("write");

        let err = load_forest(&path, NameLimits::default()).expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<AncestryError>(),
            Some(AncestryError::Cycle { .. })
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("forest.json");
        fs::write(&path, r#"{ "version": 99, "last_id": 0, "animals": [] }"#).expect("write");

        let err = load_forest(&path, NameLimits::default()).expect_err("should fail");
        assert!(err.to_string().contains("unsupported snapshot version 99"));
    }
}
