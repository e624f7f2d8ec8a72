pub mod add;
pub mod attach;
pub mod common;
pub mod delete;
pub mod enrich;
pub mod graph;
pub mod init;
pub mod lineage;
pub mod list;
pub mod move_cmd;
pub mod show;
pub mod update;

use clap::Args;
use evograph_core::Attributes;

/// Descriptive attribute flags shared by `add`, `attach`, and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct AttributeArgs {
    /// Scientific name; its presence makes the node a leaf species.
    #[arg(long)]
    pub scientific_name: Option<String>,

    /// Taxonomic class (e.g. "Mammalia").
    #[arg(long = "class")]
    pub taxonomy_class: Option<String>,

    #[arg(long)]
    pub lifespan: Option<String>,

    #[arg(long)]
    pub weight: Option<String>,

    /// Where the animal lives.
    #[arg(long)]
    pub locations: Option<String>,

    #[arg(long)]
    pub temperament: Option<String>,
}

impl AttributeArgs {
    #[must_use]
    pub fn to_attributes(&self) -> Attributes {
        Attributes {
            scientific_name: self.scientific_name.clone(),
            taxonomy_class: self.taxonomy_class.clone(),
            lifespan: self.lifespan.clone(),
            weight: self.weight.clone(),
            locations: self.locations.clone(),
            temperament: self.temperament.clone(),
            ..Attributes::default()
        }
    }
}
