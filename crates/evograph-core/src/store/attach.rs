//! Attach a leaf species under a classification path.
//!
//! The classification collaborator resolves a new animal's name to an
//! ordered taxonomy path (kingdom first). Each taxon on the path is reused
//! by name when it already exists, otherwise it is created under the
//! previous one. The leaf then either upgrades a same-named taxon in place
//! or is created under the last taxon.

use serde::Serialize;
use tracing::debug;

use super::forest::Forest;
use crate::error::AncestryError;
use crate::model::{AnimalId, AnimalNode, Attributes, NewAnimal};

/// A created (or upgraded) node plus a note about deferred work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub animal: AnimalNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl CreateOutcome {
    pub(crate) fn created(animal: AnimalNode) -> Self {
        let status_message = animal
            .enrichment
            .is_pending()
            .then(|| format!("'{}' added; enrichment pending", animal.name));
        Self {
            animal,
            status_message,
        }
    }
}

impl Forest {
    /// Attach `leaf` under the taxonomy path `hierarchy`.
    ///
    /// All names are validated before anything is written, so the call is
    /// all-or-nothing. Blank path entries are skipped.
    ///
    /// # Errors
    ///
    /// - [`AncestryError::Validation`] for any bad name.
    /// - [`AncestryError::DuplicateName`] if a leaf species with the leaf's
    ///   name already exists.
    pub fn attach_lineage(
        &mut self,
        hierarchy: &[String],
        leaf: NewAnimal,
    ) -> Result<CreateOutcome, AncestryError> {
        let limits = self.limits();
        let leaf_name = limits.check_name(&leaf.name)?;
        let mut attributes = leaf.attributes;
        limits.check_attributes(&mut attributes)?;

        let taxa: Vec<String> = hierarchy
            .iter()
            .filter(|taxon| !taxon.trim().is_empty())
            .map(|taxon| limits.check_name(taxon))
            .collect::<Result<_, _>>()?;

        if self.find_by_name(&leaf_name).is_some_and(AnimalNode::is_leaf) {
            return Err(AncestryError::DuplicateName(leaf_name));
        }

        let mut parent: Option<AnimalId> = None;
        for taxon in &taxa {
            let id = match self.find_by_name(taxon) {
                Some(existing) => existing.id,
                None => {
                    let created = self.commit(taxon.clone(), Attributes::default(), parent);
                    debug!(id = %created.id, name = %created.name, "created taxon");
                    created.id
                }
            };
            parent = Some(id);
        }

        let existing = self.find_by_name(&leaf_name).map(|node| node.id);
        let animal = match existing {
            // A same-named node here is a taxon (leaves were rejected above);
            // gaining a scientific name queues it for enrichment.
            Some(id) => self.update_attributes(id, attributes)?,
            None => self.commit(leaf_name.clone(), attributes, parent),
        };

        let path = taxa
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(leaf_name.as_str()))
            .collect::<Vec<_>>()
            .join(" → ");
        let mut message = format!("'{leaf_name}' added! Hierarchy: {path}");
        if animal.enrichment.is_pending() {
            message.push_str(" (enrichment pending)");
        }

        Ok(CreateOutcome {
            animal,
            status_message: Some(message),
        })
    }
}
