use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::graph::LcaOptions;
use crate::model::NameLimits;

/// Name of the per-project state directory.
pub const PROJECT_DIR: &str = ".evograph";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub names: NamesConfig,
}

impl ProjectConfig {
    #[must_use]
    pub const fn name_limits(&self) -> NameLimits {
        NameLimits {
            max_name_len: self.names.max_len,
            max_scientific_len: self.names.max_scientific_len,
        }
    }

    #[must_use]
    pub const fn lca_options(&self) -> LcaOptions {
        LcaOptions {
            require_leaf_endpoints: self.query.require_leaf_endpoints,
        }
    }

    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.store.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file name, relative to the project directory.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_true")]
    pub require_leaf_endpoints: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            require_leaf_endpoints: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default = "default_max_scientific_len")]
    pub max_scientific_len: usize,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            max_scientific_len: default_max_scientific_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Resolved locations inside one project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub dir: PathBuf,
    pub config: PathBuf,
    pub snapshot: PathBuf,
    pub lock: PathBuf,
}

impl ProjectPaths {
    #[must_use]
    pub fn new(dir: &Path, config: &ProjectConfig) -> Self {
        Self {
            dir: dir.to_path_buf(),
            config: dir.join("config.toml"),
            snapshot: dir.join(&config.store.snapshot),
            lock: dir.join("forest.lock"),
        }
    }
}

/// Walk up from `start` looking for a `.evograph/` directory.
#[must_use]
pub fn discover_project_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load `config.toml` from a project directory (the `.evograph/` dir itself).
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig> {
    let path = project_dir.join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Fails if the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("evograph/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the output mode: `--json`, then `FORMAT`, then user config, then
/// pretty on a terminal and text otherwise.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>) -> String {
    resolve_output_from(cli_json, user_output, env::var("FORMAT").ok().as_deref())
}

fn resolve_output_from(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

fn default_snapshot() -> String {
    "forest.json".to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}

const fn default_max_len() -> usize {
    100
}

const fn default_max_scientific_len() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.store.snapshot, "forest.json");
        assert_eq!(cfg.lock_timeout(), Duration::from_secs(5));
        assert!(cfg.lca_options().require_leaf_endpoints);
        assert_eq!(cfg.name_limits(), NameLimits::default());
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("config.toml"),
            "[query]\nrequire_leaf_endpoints = false\n\n[names]\nmax_len = 40\n",
        )
        .expect("write config");

        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert!(!cfg.query.require_leaf_endpoints);
        assert_eq!(cfg.names.max_len, 40);
        assert_eq!(cfg.names.max_scientific_len, 200);
        assert_eq!(cfg.store, StoreConfig::default());
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("config.toml"), "[store\nsnapshot = 3").expect("write");
        let err = load_project_config(dir.path()).expect_err("should fail");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output_from(true, Some("pretty"), Some("text")), "json");
    }

    #[test]
    fn env_beats_user_config_and_aliases_normalize() {
        assert_eq!(resolve_output_from(false, Some("table"), Some("human")), "pretty");
        assert_eq!(resolve_output_from(false, Some("human"), Some("table")), "text");
        assert_eq!(resolve_output_from(false, Some("json"), Some("bogus")), "json");
    }

    #[test]
    fn discover_walks_up_to_project_dir() {
        let root = tempfile::tempdir().expect("temp dir");
        let project = root.path().join(PROJECT_DIR);
        let nested = root.path().join("a/b/c");
        std::fs::create_dir_all(&project).expect("create project dir");
        std::fs::create_dir_all(&nested).expect("create nested dir");

        assert_eq!(discover_project_dir(&nested), Some(project.clone()));
        assert_eq!(discover_project_dir(root.path()), Some(project));
    }

    #[test]
    fn project_paths_follow_configured_snapshot_name() {
        let mut cfg = ProjectConfig::default();
        cfg.store.snapshot = "zoo.json".to_string();
        let paths = ProjectPaths::new(Path::new("/tmp/p/.evograph"), &cfg);
        assert_eq!(paths.snapshot, PathBuf::from("/tmp/p/.evograph/zoo.json"));
        assert_eq!(paths.lock, PathBuf::from("/tmp/p/.evograph/forest.lock"));
        assert_eq!(paths.config, PathBuf::from("/tmp/p/.evograph/config.toml"));
    }
}
