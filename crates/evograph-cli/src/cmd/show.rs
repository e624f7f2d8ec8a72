//! `evo show`: full details of one node.

use anyhow::Result;
use clap::Args;
use evograph_core::AnimalId;
use std::path::Path;

use crate::output::{OutputMode, animal_line, pretty_animal, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: AnimalId,
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let animal = project.read(|store| Ok(store.get_by_id(args.id)?))?;

    render_mode(
        output,
        &animal,
        |a, w| {
            writeln!(w, "{}", animal_line(a))?;
            let attrs = &a.attributes;
            for (key, value) in [
                ("class", &attrs.taxonomy_class),
                ("lifespan", &attrs.lifespan),
                ("weight", &attrs.weight),
                ("locations", &attrs.locations),
                ("temperament", &attrs.temperament),
                ("fun_fact", &attrs.fun_fact),
                ("image_url", &attrs.image_url),
            ] {
                if let Some(value) = value {
                    writeln!(w, "{key}\t{value}")?;
                }
            }
            writeln!(w, "enrichment\t{}", a.enrichment.label())
        },
        |a, w| pretty_animal(w, a),
    )
}
