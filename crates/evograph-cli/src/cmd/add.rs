//! `evo add`: create one animal node, optionally under an ancestor.

use anyhow::Result;
use clap::Args;
use evograph_core::{AnimalId, CreateOutcome, NewAnimal};
use std::path::Path;

use crate::cmd::AttributeArgs;
use crate::output::{OutputMode, animal_line, pretty_animal, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name (unique across the forest).
    pub name: String,

    /// Id of the ancestor node. Omit to create a root.
    #[arg(long)]
    pub ancestor: Option<AnimalId>,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

pub fn run_add(args: &AddArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let new = NewAnimal::named(args.name.clone()).with_attributes(args.attributes.to_attributes());
    let outcome = project.write(|store| Ok(store.add_node(new, args.ancestor)?))?;
    render_outcome(output, &outcome)
}

/// Shared renderer for `add` and `attach`.
pub fn render_outcome(output: OutputMode, outcome: &CreateOutcome) -> Result<()> {
    render_mode(
        output,
        outcome,
        |o, w| {
            writeln!(w, "{}", animal_line(&o.animal))?;
            if let Some(ref message) = o.status_message {
                writeln!(w, "{message}")?;
            }
            Ok(())
        },
        |o, w| {
            if let Some(ref message) = o.status_message {
                writeln!(w, "✓ {message}")?;
            } else {
                writeln!(w, "✓ '{}' added", o.animal.name)?;
            }
            pretty_animal(w, &o.animal)
        },
    )
}
