//! `evo move`: re-parent a node under a different ancestor, or make it a
//! root.

use anyhow::Result;
use clap::Args;
use evograph_core::AnimalId;
use std::path::Path;

use crate::output::{OutputMode, animal_line, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Node to move.
    pub id: AnimalId,

    /// New ancestor id.
    #[arg(long, conflicts_with = "root", required_unless_present = "root")]
    pub ancestor: Option<AnimalId>,

    /// Detach the node and make it a root.
    #[arg(long)]
    pub root: bool,
}

impl MoveArgs {
    const fn target(&self) -> Option<AnimalId> {
        if self.root { None } else { self.ancestor }
    }
}

pub fn run_move(args: &MoveArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let moved = project.write(|store| Ok(store.set_ancestor(args.id, args.target())?))?;

    render_mode(
        output,
        &moved,
        |a, w| writeln!(w, "{}", animal_line(a)),
        |a, w| match a.ancestor_id {
            Some(ancestor) => writeln!(w, "✓ Moved #{} {} under #{ancestor}", a.id, a.name),
            None => writeln!(w, "✓ #{} {} is now a root", a.id, a.name),
        },
    )
}
