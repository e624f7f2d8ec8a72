//! `evo list`: every node, sorted by id.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::output::{OutputMode, animal_line, pretty_section, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list leaf species.
    #[arg(long)]
    pub species: bool,
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let mut animals = project.read(|store| Ok(store.get_all()))?;
    if args.species {
        animals.retain(evograph_core::AnimalNode::is_leaf);
    }

    render_mode(
        output,
        &animals,
        |animals, w| {
            for animal in animals {
                writeln!(w, "{}", animal_line(animal))?;
            }
            Ok(())
        },
        |animals, w| {
            pretty_section(w, &format!("Animals ({})", animals.len()))?;
            if animals.is_empty() {
                return writeln!(w, "(none yet; add one with `evo add <name>`)");
            }
            for animal in animals {
                let ancestor = animal
                    .ancestor_id
                    .map_or_else(|| "root".to_string(), |id| format!("under #{id}"));
                match animal.scientific_name() {
                    Some(sci) => writeln!(w, "#{:<5} {} ({sci}), {ancestor}", animal.id, animal.name)?,
                    None => writeln!(w, "#{:<5} {}, {ancestor}", animal.id, animal.name)?,
                }
            }
            Ok(())
        },
    )
}
