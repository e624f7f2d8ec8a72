//! `evo enrich`: inspect and resolve deferred enrichment.
//!
//! Three modes:
//! - `--pending` lists the queue,
//! - `<id>` with field flags (or `--fail <reason>`) resolves one node,
//! - `--from-file <json>` runs a whole pass from a name-keyed JSON object.

use anyhow::{Context as _, Result};
use clap::Args;
use evograph_core::enrichment::{EnrichmentFailure, run_enrichment};
use evograph_core::model::{Enrichment, EnrichmentRequest};
use evograph_core::{AncestryError, AnimalId, Attributes};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::output::{OutputMode, animal_line, pretty_animal, pretty_kv, pretty_section, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Node to resolve.
    #[arg(conflicts_with_all = ["pending", "from_file"], required_unless_present_any = ["pending", "from_file"])]
    pub id: Option<AnimalId>,

    /// List nodes still waiting for enrichment.
    #[arg(long, conflicts_with = "from_file")]
    pub pending: bool,

    /// Apply a JSON object of `{"<animal name>": {<fields>}}` to every
    /// pending node. Pending names missing from the file are marked failed.
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    #[arg(long)]
    pub fun_fact: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,

    /// Ancestor proposed by classification; only used if the node is a root.
    #[arg(long)]
    pub suggest_ancestor: Option<AnimalId>,

    /// Give up on the node and record why.
    #[arg(long, conflicts_with_all = ["fun_fact", "image_url", "suggest_ancestor"])]
    pub fail: Option<String>,
}

impl EnrichArgs {
    fn enrichment(&self) -> Enrichment {
        Enrichment {
            attributes: Attributes {
                fun_fact: self.fun_fact.clone(),
                image_url: self.image_url.clone(),
                ..Attributes::default()
            },
            suggested_ancestor: self.suggest_ancestor,
        }
    }
}

pub fn run_enrich(args: &EnrichArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;

    if args.pending {
        let pending = project.read(|store| Ok(store.pending_enrichment()))?;
        return render_pending(output, &pending);
    }

    if let Some(ref path) = args.from_file {
        let results = read_results(path)?;
        let report = project.write(|store| {
            let enricher = |request: &EnrichmentRequest| -> Result<Enrichment, EnrichmentFailure> {
                results
                    .get(&request.name)
                    .cloned()
                    .ok_or_else(|| EnrichmentFailure::new(format!("no entry for '{}'", request.name)))
            };
            Ok(run_enrichment(store, &enricher))
        })?;
        return render_mode(
            output,
            &report,
            |r, w| {
                writeln!(
                    w,
                    "applied={}\tfailed={}\tskipped={}",
                    r.applied.len(),
                    r.failed.len(),
                    r.skipped.len()
                )
            },
            |r, w| {
                pretty_section(w, &format!("Enrichment pass ({} node(s))", r.total()))?;
                pretty_kv(w, "Applied", r.applied.len().to_string())?;
                pretty_kv(w, "Failed", r.failed.len().to_string())?;
                pretty_kv(w, "Skipped", r.skipped.len().to_string())
            },
        );
    }

    let Some(id) = args.id else {
        anyhow::bail!("pass an animal id, --pending, or --from-file");
    };
    let enrichment = args.enrichment();
    if args.fail.is_none() && enrichment.attributes.is_empty() && enrichment.suggested_ancestor.is_none()
    {
        return Err(AncestryError::Validation {
            field: "enrichment",
            reason: "pass --fun-fact, --image-url, --suggest-ancestor, or --fail".to_string(),
        }
        .into());
    }

    let node = project.write(|store| {
        Ok(match args.fail {
            Some(ref reason) => store.mark_enrichment_failed(id, reason)?,
            None => store.apply_enrichment(id, enrichment)?,
        })
    })?;

    render_mode(
        output,
        &node,
        |a, w| writeln!(w, "{}\t{}", animal_line(a), a.enrichment.label()),
        |a, w| {
            writeln!(w, "✓ Enrichment for #{} {} is {}", a.id, a.name, a.enrichment.label())?;
            pretty_animal(w, a)
        },
    )
}

fn read_results(path: &Path) -> Result<HashMap<String, Enrichment>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn render_pending(output: OutputMode, pending: &[EnrichmentRequest]) -> Result<()> {
    render_mode(
        output,
        &pending,
        |p, w| {
            for request in *p {
                writeln!(
                    w,
                    "{}\t{}\t{}",
                    request.id,
                    request.name,
                    request.taxonomy_class.as_deref().unwrap_or("-")
                )?;
            }
            Ok(())
        },
        |p, w| {
            pretty_section(w, &format!("Pending enrichment ({})", p.len()))?;
            for request in *p {
                writeln!(w, "  #{} {}", request.id, request.name)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_flags_build_enrichment() {
        let args = EnrichArgs {
            id: Some(AnimalId::new(3)),
            pending: false,
            from_file: None,
            fun_fact: Some("Roars".into()),
            image_url: None,
            suggest_ancestor: Some(AnimalId::new(1)),
            fail: None,
        };
        let enrichment = args.enrichment();
        assert_eq!(enrichment.attributes.fun_fact.as_deref(), Some("Roars"));
        assert_eq!(enrichment.suggested_ancestor, Some(AnimalId::new(1)));
    }

    #[test]
    fn results_file_is_keyed_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(
            &path,
            r#"{"Lion": {"fun_fact": "Sleeps 20h", "suggested_ancestor": 2}}"#,
        )
        .unwrap();
        let results = read_results(&path).unwrap();
        let lion = &results["Lion"];
        assert_eq!(lion.attributes.fun_fact.as_deref(), Some("Sleeps 20h"));
        assert_eq!(lion.suggested_ancestor, Some(AnimalId::new(2)));
    }

    #[test]
    fn unreadable_results_file_names_the_path() {
        let err = read_results(Path::new("/nonexistent/results.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/results.json"));
    }
}
