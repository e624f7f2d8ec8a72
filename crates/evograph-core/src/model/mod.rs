//! Data model: the animal record, its identifier, and enrichment state.

pub mod animal;
pub mod enrichment;

pub use animal::{AnimalId, AnimalNode, Attributes, NameLimits, NewAnimal, ParseAnimalIdError};
pub use enrichment::{Enrichment, EnrichmentRequest, EnrichmentStatus};
