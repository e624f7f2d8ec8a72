//! `evo delete`: remove one node. Descendants are not touched; their
//! ancestor link dangles and they are reported back.

use anyhow::Result;
use clap::Args;
use evograph_core::AnimalId;
use std::path::Path;

use crate::output::{OutputMode, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: AnimalId,
}

pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let deletion = project.write(|store| Ok(store.delete(args.id)?))?;

    let orphans = || {
        deletion
            .orphaned
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    render_mode(
        output,
        &deletion,
        |d, w| writeln!(w, "deleted\t{}\t{}\torphaned={}", d.removed.id, d.removed.name, orphans()),
        |d, w| {
            writeln!(w, "✓ Deleted #{} {}", d.removed.id, d.removed.name)?;
            if !d.orphaned.is_empty() {
                writeln!(
                    w,
                    "  {} descendant(s) now have a broken ancestor link: {}",
                    d.orphaned.len(),
                    orphans()
                )?;
            }
            Ok(())
        },
    )
}
