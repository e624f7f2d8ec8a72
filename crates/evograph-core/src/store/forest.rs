//! The node set and its invariants, without any locking.
//!
//! [`Forest`] is an index from id to node plus a parent pointer on each
//! node; only upward traversal is ever needed, so there is no child
//! adjacency list. Every mutation validates fully before it writes, so a
//! failed call leaves the forest untouched.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::error::AncestryError;
use crate::graph::AncestryView;
use crate::graph::chain::{ancestor_chain, check_reparent};
use crate::model::{
    AnimalId, AnimalNode, Attributes, Enrichment, EnrichmentRequest, EnrichmentStatus, NameLimits,
    NewAnimal,
};

/// Result of a non-cascading delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deletion {
    pub removed: AnimalNode,
    /// Former children whose `ancestor_id` now dangles. They are not
    /// modified.
    pub orphaned: Vec<AnimalId>,
}

#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: BTreeMap<AnimalId, AnimalNode>,
    names: HashMap<String, AnimalId>,
    last_id: u64,
    limits: NameLimits,
}

impl Forest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: NameLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Rebuild a forest from persisted parts, re-checking every invariant.
    ///
    /// Broken links are accepted (they are a normal state after deletes) and
    /// logged.
    ///
    /// # Errors
    ///
    /// - [`AncestryError::Validation`] for a zero or repeated id.
    /// - [`AncestryError::DuplicateName`] if two nodes share a name.
    /// - [`AncestryError::Cycle`] if any ancestor chain loops.
    pub fn from_parts(
        last_id: u64,
        animals: Vec<AnimalNode>,
        limits: NameLimits,
    ) -> Result<Self, AncestryError> {
        let mut forest = Self {
            last_id,
            limits,
            ..Self::default()
        };

        for animal in animals {
            if animal.id.get() == 0 {
                return Err(AncestryError::validation("id", "ids start at 1"));
            }
            if forest.nodes.contains_key(&animal.id) {
                return Err(AncestryError::validation(
                    "id",
                    format!("id {} appears more than once", animal.id),
                ));
            }
            if forest.names.insert(animal.name.clone(), animal.id).is_some() {
                return Err(AncestryError::DuplicateName(animal.name));
            }
            forest.last_id = forest.last_id.max(animal.id.get());
            forest.nodes.insert(animal.id, animal);
        }

        for &id in forest.nodes.keys() {
            ancestor_chain(&forest.nodes, id)?;
        }
        for link in crate::graph::broken_links(&forest) {
            warn!(id = %link.id, name = %link.name, missing = %link.missing_ancestor, "broken ancestry link");
        }

        Ok(forest)
    }

    /// Highest id ever assigned. Persisted so ids are never reused.
    #[must_use]
    pub const fn last_id(&self) -> u64 {
        self.last_id
    }

    #[must_use]
    pub const fn limits(&self) -> NameLimits {
        self.limits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: AnimalId) -> Option<&AnimalNode> {
        self.nodes.get(&id)
    }

    /// Look up a node by its (trimmed) name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&AnimalNode> {
        self.names
            .get(name.trim())
            .and_then(|id| self.nodes.get(id))
    }

    /// Nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimalNode> {
        self.nodes.values()
    }

    /// Create a node under `ancestor` (or as a root).
    ///
    /// # Errors
    ///
    /// - [`AncestryError::Validation`] for a bad name or scientific name.
    /// - [`AncestryError::DuplicateName`] if the name is taken.
    /// - [`AncestryError::NotFound`] if `ancestor` does not exist.
    pub fn insert(
        &mut self,
        new: NewAnimal,
        ancestor: Option<AnimalId>,
    ) -> Result<AnimalNode, AncestryError> {
        let name = self.limits.check_name(&new.name)?;
        let mut attributes = new.attributes;
        self.limits.check_attributes(&mut attributes)?;

        if self.names.contains_key(&name) {
            return Err(AncestryError::DuplicateName(name));
        }
        if let Some(ancestor) = ancestor {
            if !self.nodes.contains_key(&ancestor) {
                return Err(AncestryError::NotFound(ancestor));
            }
        }

        Ok(self.commit(name, attributes, ancestor))
    }

    /// Add an already-validated node. Infallible.
    pub(crate) fn commit(
        &mut self,
        name: String,
        attributes: Attributes,
        ancestor: Option<AnimalId>,
    ) -> AnimalNode {
        self.last_id += 1;
        let node = AnimalNode {
            id: AnimalId::new(self.last_id),
            name,
            ancestor_id: ancestor,
            enrichment: EnrichmentStatus::initial_for(&attributes),
            attributes,
        };
        self.names.insert(node.name.clone(), node.id);
        self.nodes.insert(node.id, node.clone());
        node
    }

    /// Remove a node. Descendants keep their now-dangling `ancestor_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if `id` does not exist.
    pub fn remove(&mut self, id: AnimalId) -> Result<Deletion, AncestryError> {
        let removed = self.nodes.remove(&id).ok_or(AncestryError::NotFound(id))?;
        self.names.remove(&removed.name);

        let orphaned = self
            .nodes
            .values()
            .filter(|node| node.ancestor_id == Some(id))
            .map(|node| node.id)
            .collect();

        Ok(Deletion { removed, orphaned })
    }

    /// Change descriptive attributes. `Some` fields in `patch` overwrite.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] or [`AncestryError::Validation`].
    pub fn update_attributes(
        &mut self,
        id: AnimalId,
        mut patch: Attributes,
    ) -> Result<AnimalNode, AncestryError> {
        self.limits.check_attributes(&mut patch)?;
        let node = self.nodes.get_mut(&id).ok_or(AncestryError::NotFound(id))?;

        let was_leaf = node.is_leaf();
        node.attributes.merge(patch);
        if !was_leaf && node.is_leaf() {
            node.enrichment = EnrichmentStatus::initial_for(&node.attributes);
        }
        Ok(node.clone())
    }

    /// Re-parent `id` under `ancestor`, or make it a root with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if either node is missing, or
    /// [`AncestryError::Cycle`] if `ancestor` is `id` or one of its
    /// descendants.
    pub fn set_ancestor(
        &mut self,
        id: AnimalId,
        ancestor: Option<AnimalId>,
    ) -> Result<AnimalNode, AncestryError> {
        match ancestor {
            Some(ancestor) => check_reparent(&self.nodes, id, ancestor)?,
            None if !self.nodes.contains_key(&id) => return Err(AncestryError::NotFound(id)),
            None => {}
        }

        let node = self.nodes.get_mut(&id).ok_or(AncestryError::NotFound(id))?;
        node.ancestor_id = ancestor;
        Ok(node.clone())
    }

    /// Requests for every node still waiting on enrichment, in id order.
    #[must_use]
    pub fn pending_enrichment(&self) -> Vec<EnrichmentRequest> {
        self.nodes
            .values()
            .filter(|node| node.enrichment.is_pending())
            .map(|node| EnrichmentRequest {
                id: node.id,
                name: node.name.clone(),
                taxonomy_class: node.attributes.taxonomy_class.clone(),
            })
            .collect()
    }

    /// Store an enrichment result and mark the node complete.
    ///
    /// A suggested ancestor is only applied to a node that has none, and
    /// goes through the same cycle check as [`set_ancestor`](Self::set_ancestor).
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if the node was deleted meanwhile,
    /// or the validation/cycle errors of the suggested ancestor. Nothing is
    /// applied on error.
    pub fn apply_enrichment(
        &mut self,
        id: AnimalId,
        enrichment: Enrichment,
    ) -> Result<AnimalNode, AncestryError> {
        let Enrichment {
            mut attributes,
            suggested_ancestor,
        } = enrichment;
        self.limits.check_attributes(&mut attributes)?;

        let current = self.nodes.get(&id).ok_or(AncestryError::NotFound(id))?;
        let adopt = suggested_ancestor.filter(|_| current.is_root());
        if let Some(ancestor) = adopt {
            check_reparent(&self.nodes, id, ancestor)?;
        }

        let node = self.nodes.get_mut(&id).ok_or(AncestryError::NotFound(id))?;
        node.attributes.merge(attributes);
        if adopt.is_some() {
            node.ancestor_id = adopt;
        }
        node.enrichment = EnrichmentStatus::Complete;
        Ok(node.clone())
    }

    /// Record that enrichment gave up on this node.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if the node was deleted meanwhile.
    pub fn mark_enrichment_failed(
        &mut self,
        id: AnimalId,
        reason: impl Into<String>,
    ) -> Result<AnimalNode, AncestryError> {
        let node = self.nodes.get_mut(&id).ok_or(AncestryError::NotFound(id))?;
        node.enrichment = EnrichmentStatus::Failed {
            reason: reason.into(),
        };
        Ok(node.clone())
    }
}

impl AncestryView for Forest {
    fn node(&self, id: AnimalId) -> Option<&AnimalNode> {
        self.nodes.get(&id)
    }

    fn nodes(&self) -> impl Iterator<Item = &AnimalNode> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::chain::ancestor_chain;

    fn leaf(name: &str, sci: &str) -> NewAnimal {
        NewAnimal::named(name).with_scientific_name(sci)
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut forest = Forest::new();
        let a = forest.insert(NewAnimal::named("Mammalia"), None).unwrap();
        let b = forest.insert(leaf("Lion", "Panthera leo"), Some(a.id)).unwrap();
        assert_eq!(a.id, AnimalId::new(1));
        assert_eq!(b.id, AnimalId::new(2));
        assert_eq!(b.ancestor_id, Some(a.id));
        assert!(b.enrichment.is_pending());
        assert_eq!(a.enrichment, EnrichmentStatus::Complete);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut forest = Forest::new();
        let a = forest.insert(NewAnimal::named("Mammalia"), None).unwrap();
        forest.remove(a.id).unwrap();
        let b = forest.insert(NewAnimal::named("Aves"), None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn insert_rejects_empty_name() {
        let mut forest = Forest::new();
        assert!(matches!(
            forest.insert(NewAnimal::named("  "), None),
            Err(AncestryError::Validation { field: "name", .. })
        ));
        assert!(forest.is_empty());
    }

    #[test]
    fn insert_rejects_unknown_ancestor() {
        let mut forest = Forest::new();
        assert_eq!(
            forest.insert(NewAnimal::named("Lion"), Some(AnimalId::new(9))),
            Err(AncestryError::NotFound(AnimalId::new(9)))
        );
        assert_eq!(forest.last_id(), 0);
    }

    #[test]
    fn insert_rejects_duplicate_name() {
        let mut forest = Forest::new();
        forest.insert(NewAnimal::named("Lion"), None).unwrap();
        assert_eq!(
            forest.insert(NewAnimal::named(" Lion "), None),
            Err(AncestryError::DuplicateName("Lion".into()))
        );
    }

    #[test]
    fn remove_leaves_children_dangling() {
        let mut forest = Forest::new();
        let root = forest.insert(NewAnimal::named("Mammalia"), None).unwrap();
        let cat = forest.insert(NewAnimal::named("Felidae"), Some(root.id)).unwrap();
        let lion = forest.insert(leaf("Lion", "Panthera leo"), Some(cat.id)).unwrap();

        let deletion = forest.remove(cat.id).unwrap();
        assert_eq!(deletion.removed.id, cat.id);
        assert_eq!(deletion.orphaned, vec![lion.id]);

        let lion_after = forest.get(lion.id).unwrap();
        assert_eq!(lion_after.ancestor_id, Some(cat.id));
        assert!(forest.find_by_name("Felidae").is_none());
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let mut forest = Forest::new();
        assert_eq!(
            forest.remove(AnimalId::new(4)),
            Err(AncestryError::NotFound(AnimalId::new(4)))
        );
    }

    #[test]
    fn set_ancestor_rejects_cycles_and_keeps_state() {
        let mut forest = Forest::new();
        let a = forest.insert(NewAnimal::named("A"), None).unwrap();
        let b = forest.insert(NewAnimal::named("B"), Some(a.id)).unwrap();
        let c = forest.insert(NewAnimal::named("C"), Some(b.id)).unwrap();

        assert!(matches!(
            forest.set_ancestor(a.id, Some(c.id)),
            Err(AncestryError::Cycle { .. })
        ));
        assert_eq!(forest.get(a.id).unwrap().ancestor_id, None);

        let moved = forest.set_ancestor(c.id, Some(a.id)).unwrap();
        assert_eq!(moved.ancestor_id, Some(a.id));
        let root = forest.set_ancestor(c.id, None).unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn update_attributes_can_promote_taxon_to_leaf() {
        let mut forest = Forest::new();
        let node = forest.insert(NewAnimal::named("Gorilla"), None).unwrap();
        assert!(!node.is_leaf());

        let updated = forest
            .update_attributes(
                node.id,
                Attributes {
                    scientific_name: Some("Gorilla gorilla".into()),
                    weight: Some("160 kg".into()),
                    ..Attributes::default()
                },
            )
            .unwrap();
        assert!(updated.is_leaf());
        assert!(updated.enrichment.is_pending());
        assert_eq!(updated.attributes.weight.as_deref(), Some("160 kg"));
    }

    #[test]
    fn enrichment_lifecycle() {
        let mut forest = Forest::new();
        let lion = forest.insert(leaf("Lion", "Panthera leo"), None).unwrap();
        assert_eq!(forest.pending_enrichment().len(), 1);

        let enriched = forest
            .apply_enrichment(
                lion.id,
                Enrichment {
                    attributes: Attributes {
                        fun_fact: Some("Lions are the only social cats.".into()),
                        ..Attributes::default()
                    },
                    suggested_ancestor: None,
                },
            )
            .unwrap();
        assert_eq!(enriched.enrichment, EnrichmentStatus::Complete);
        assert!(forest.pending_enrichment().is_empty());
    }

    #[test]
    fn suggested_ancestor_applies_only_to_roots() {
        let mut forest = Forest::new();
        let felidae = forest.insert(NewAnimal::named("Felidae"), None).unwrap();
        let other = forest.insert(NewAnimal::named("Canidae"), None).unwrap();
        let lion = forest.insert(leaf("Lion", "Panthera leo"), None).unwrap();

        let suggestion = |ancestor| Enrichment {
            suggested_ancestor: Some(ancestor),
            ..Enrichment::default()
        };

        let adopted = forest.apply_enrichment(lion.id, suggestion(felidae.id)).unwrap();
        assert_eq!(adopted.ancestor_id, Some(felidae.id));

        let kept = forest.apply_enrichment(lion.id, suggestion(other.id)).unwrap();
        assert_eq!(kept.ancestor_id, Some(felidae.id));
    }

    #[test]
    fn failed_enrichment_is_recorded() {
        let mut forest = Forest::new();
        let lion = forest.insert(leaf("Lion", "Panthera leo"), None).unwrap();
        let node = forest.mark_enrichment_failed(lion.id, "quota exceeded").unwrap();
        assert_eq!(
            node.enrichment,
            EnrichmentStatus::Failed {
                reason: "quota exceeded".into()
            }
        );
        assert!(forest.pending_enrichment().is_empty());
    }

    #[test]
    fn from_parts_rejects_corrupt_snapshots() {
        let mut forest = Forest::new();
        let a = forest.insert(NewAnimal::named("A"), None).unwrap();
        let mut b = forest.insert(NewAnimal::named("B"), Some(a.id)).unwrap();
        let mut a_looped = a.clone();
        a_looped.ancestor_id = Some(b.id);

        let err = Forest::from_parts(2, vec![a_looped, b.clone()], NameLimits::default());
        assert!(matches!(err, Err(AncestryError::Cycle { .. })));

        b.name = "A".into();
        let err = Forest::from_parts(2, vec![a, b], NameLimits::default());
        assert_eq!(err.unwrap_err(), AncestryError::DuplicateName("A".into()));
    }

    #[test]
    fn from_parts_keeps_broken_links_and_counter() {
        let mut forest = Forest::new();
        let a = forest.insert(NewAnimal::named("A"), None).unwrap();
        let b = forest.insert(NewAnimal::named("B"), Some(a.id)).unwrap();

        let rebuilt = Forest::from_parts(7, vec![b.clone()], NameLimits::default()).unwrap();
        assert_eq!(rebuilt.last_id(), 7);
        let chain = ancestor_chain(&rebuilt, b.id).unwrap();
        assert_eq!(chain.top(), b.id);
    }
}
