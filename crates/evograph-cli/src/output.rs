//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or
//! stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use evograph_core::config::{load_user_config, resolve_output};
use evograph_core::error::ErrorCode;
use evograph_core::lock::LockError;
use evograph_core::{AncestryError, AnimalNode};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

use crate::project::ProjectError;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn from_resolved(mode: &str) -> Self {
        match mode {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Resolve the output mode from the `--json` flag, environment, user
/// config, and TTY defaults.
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let user = load_user_config().unwrap_or_else(|err| {
        warn!("ignoring unreadable user config: {err:#}");
        evograph_core::config::UserConfig::default()
    });
    OutputMode::from_resolved(&resolve_output(json_flag, user.output.as_deref()))
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text
/// mode, the provided `human_fn` closure is called to produce text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// One-line summary of a node used by several commands.
pub fn animal_line(animal: &AnimalNode) -> String {
    let kind = if animal.is_leaf() { "species" } else { "taxon" };
    let ancestor = animal
        .ancestor_id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    animal.scientific_name().map_or_else(
        || format!("{}\t{}\t{}\t{}", animal.id, animal.name, ancestor, kind),
        |sci| format!("{}\t{}\t{}\t{}\t{}", animal.id, animal.name, ancestor, kind, sci),
    )
}

/// Full human view of one node.
pub fn pretty_animal(w: &mut dyn Write, animal: &AnimalNode) -> io::Result<()> {
    pretty_section(w, &format!("#{} {}", animal.id, animal.name))?;
    let kind = if animal.is_leaf() { "species" } else { "taxon" };
    pretty_kv(w, "Kind", kind)?;
    pretty_kv(
        w,
        "Ancestor",
        animal
            .ancestor_id
            .map_or_else(|| "(root)".to_string(), |id| format!("#{id}")),
    )?;
    let attrs = &animal.attributes;
    let fields = [
        ("Scientific", &attrs.scientific_name),
        ("Class", &attrs.taxonomy_class),
        ("Lifespan", &attrs.lifespan),
        ("Weight", &attrs.weight),
        ("Locations", &attrs.locations),
        ("Temperament", &attrs.temperament),
        ("Fun fact", &attrs.fun_fact),
        ("Image", &attrs.image_url),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            pretty_kv(w, key, value)?;
        }
    }
    pretty_kv(w, "Enrichment", animal.enrichment.label())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn coded(message: String, code: ErrorCode) -> Self {
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Classify an error by the first typed cause in its chain.
impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        for cause in err.chain() {
            if let Some(project) = cause.downcast_ref::<ProjectError>() {
                return Self::coded(message, project.code());
            }
            if let Some(lock) = cause.downcast_ref::<LockError>() {
                return Self::coded(message, lock.code());
            }
            if let Some(domain) = cause.downcast_ref::<AncestryError>() {
                return Self::coded(message, domain.code());
            }
        }
        Self::new(message)
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
