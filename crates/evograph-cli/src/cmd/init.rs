use anyhow::{Context as _, Result};
use clap::Args;
use evograph_core::config::PROJECT_DIR;
use serde::Serialize;
use std::path::Path;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.evograph/` already exists.
    /// The config is rewritten; the stored forest is kept.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[store]\n\
    snapshot = \"forest.json\"\n\
    lock_timeout_ms = 5000\n\
    \n\
    [query]\n\
    require_leaf_endpoints = true\n\
    \n\
    [names]\n\
    max_len = 100\n\
    max_scientific_len = 200\n";

#[derive(Debug, Serialize)]
struct InitReport {
    path: String,
    reinitialized: bool,
}

/// Execute `evo init`. Creates the project skeleton:
///
/// ```text
/// .evograph/
///   config.toml   (default project config)
/// ```
///
/// The snapshot file appears on the first write.
///
/// # Errors
///
/// Returns an error if `.evograph/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = project_root.join(PROJECT_DIR);
    let existed = dir.exists();

    if existed && !args.force {
        anyhow::bail!("{PROJECT_DIR}/ already exists. Use `evo init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let report = InitReport {
        path: dir.display().to_string(),
        reinitialized: existed,
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized evograph project in {}", r.path)
    })
}
