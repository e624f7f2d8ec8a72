//! `evo lineage`: the chain from one node up to its root.

use anyhow::Result;
use clap::Args;
use evograph_core::AnimalId;
use std::path::Path;

use crate::output::{OutputMode, pretty_section, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct LineageArgs {
    pub id: AnimalId,
}

pub fn run_lineage(args: &LineageArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let report = project.read(|store| Ok(store.lineage(args.id)?))?;

    render_mode(
        output,
        &report,
        |r, w| {
            for item in &r.lineage {
                writeln!(w, "{}\t{}\t{}", item.depth, item.id, item.name)?;
            }
            if let Some(missing) = r.broken_link {
                writeln!(w, "broken\t{missing}")?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(
                w,
                &format!("Lineage of {} ({} generations)", r.animal_name, r.total_generations),
            )?;
            for item in &r.lineage {
                let indent = "  ".repeat(item.depth);
                writeln!(w, "{indent}#{} {}", item.id, item.name)?;
            }
            if let Some(missing) = r.broken_link {
                let indent = "  ".repeat(r.lineage.len());
                writeln!(w, "{indent}#{missing} (deleted: broken link)")?;
            }
            Ok(())
        },
    )
}
