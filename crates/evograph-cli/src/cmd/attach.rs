//! `evo attach`: place a species under a taxonomy path, creating any
//! missing taxa on the way.

use anyhow::Result;
use clap::Args;
use evograph_core::NewAnimal;
use std::path::Path;

use crate::cmd::AttributeArgs;
use crate::cmd::add::render_outcome;
use crate::output::OutputMode;
use crate::project::Project;

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Display name of the species.
    pub name: String,

    /// Comma-separated classification, root first
    /// (e.g. "Animalia,Chordata,Mammalia,Carnivora,Felidae,Panthera").
    #[arg(long, value_delimiter = ',')]
    pub path: Vec<String>,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

pub fn run_attach(args: &AttachArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let leaf = NewAnimal::named(args.name.clone()).with_attributes(args.attributes.to_attributes());
    let outcome = project.write(|store| Ok(store.attach_lineage(&args.path, leaf)?))?;
    render_outcome(output, &outcome)
}
