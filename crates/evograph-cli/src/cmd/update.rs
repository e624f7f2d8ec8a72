//! `evo update`: change descriptive attributes of one node.

use anyhow::Result;
use clap::Args;
use evograph_core::{AncestryError, AnimalId};
use std::path::Path;

use crate::cmd::AttributeArgs;
use crate::output::{OutputMode, animal_line, pretty_animal, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: AnimalId,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

pub fn run_update(args: &UpdateArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let patch = args.attributes.to_attributes();
    if patch.is_empty() {
        return Err(AncestryError::Validation {
            field: "attributes",
            reason: "pass at least one attribute flag (see `evo update --help`)".to_string(),
        }
        .into());
    }

    let project = Project::open(project_root)?;
    let updated = project.write(|store| Ok(store.update_attributes(args.id, patch)?))?;

    render_mode(
        output,
        &updated,
        |a, w| writeln!(w, "{}", animal_line(a)),
        |a, w| {
            writeln!(w, "✓ Updated #{} {}", a.id, a.name)?;
            pretty_animal(w, a)
        },
    )
}
