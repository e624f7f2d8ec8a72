//! Ancestry store: the authoritative node set behind a read/write lock.
//!
//! Mutations ([`add_node`](AncestryStore::add_node),
//! [`delete`](AncestryStore::delete), re-parenting, enrichment) hold the
//! write lock for both their invariant checks and their commit, so no
//! reader ever sees a half-applied change. Queries hold the read lock and
//! may run concurrently with each other.
//!
//! A poisoned lock is recovered rather than propagated: every [`Forest`]
//! mutation validates before it writes, so a panic mid-call cannot leave
//! the node set inconsistent.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::AncestryError;
use crate::graph::{
    BrokenLink, CommonAncestor, GraphProjection, LcaOptions, Lineage, broken_links,
    common_ancestor_with, lineage, project_graph,
};
use crate::model::{AnimalId, AnimalNode, Attributes, Enrichment, EnrichmentRequest, NewAnimal};

mod attach;
mod forest;

pub use attach::CreateOutcome;
pub use forest::{Deletion, Forest};

#[derive(Debug, Default)]
pub struct AncestryStore {
    forest: RwLock<Forest>,
    lca: LcaOptions,
}

impl AncestryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing forest (e.g. one loaded from a snapshot).
    #[must_use]
    pub fn from_forest(forest: Forest) -> Self {
        Self {
            forest: RwLock::new(forest),
            lca: LcaOptions::default(),
        }
    }

    /// Override endpoint eligibility for [`common_ancestor`](Self::common_ancestor).
    #[must_use]
    pub const fn with_lca_options(mut self, options: LcaOptions) -> Self {
        self.lca = options;
        self
    }

    /// Shared read access for running engine functions directly.
    pub fn read(&self) -> RwLockReadGuard<'_, Forest> {
        self.forest.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Forest> {
        self.forest.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume the store and return the node set.
    #[must_use]
    pub fn into_forest(self) -> Forest {
        self.forest.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a node with a fresh id, optionally under `ancestor`.
    ///
    /// # Errors
    ///
    /// [`AncestryError::Validation`], [`AncestryError::DuplicateName`], or
    /// [`AncestryError::NotFound`] when `ancestor` does not exist.
    pub fn add_node(
        &self,
        new: NewAnimal,
        ancestor: Option<AnimalId>,
    ) -> Result<CreateOutcome, AncestryError> {
        let animal = self.write().insert(new, ancestor)?;
        info!(id = %animal.id, name = %animal.name, ancestor = ?animal.ancestor_id, "added animal");
        Ok(CreateOutcome::created(animal))
    }

    /// Attach a leaf under a classification path, creating missing taxa.
    ///
    /// # Errors
    ///
    /// See [`Forest::attach_lineage`].
    pub fn attach_lineage(
        &self,
        hierarchy: &[String],
        leaf: NewAnimal,
    ) -> Result<CreateOutcome, AncestryError> {
        let outcome = self.write().attach_lineage(hierarchy, leaf)?;
        info!(
            id = %outcome.animal.id,
            name = %outcome.animal.name,
            depth = hierarchy.len(),
            "attached animal under taxonomy path"
        );
        Ok(outcome)
    }

    /// Remove a node without touching its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if `id` does not exist.
    pub fn delete(&self, id: AnimalId) -> Result<Deletion, AncestryError> {
        let deletion = self.write().remove(id)?;
        info!(
            id = %id,
            name = %deletion.removed.name,
            orphaned = deletion.orphaned.len(),
            "deleted animal"
        );
        Ok(deletion)
    }

    /// Change descriptive attributes.
    ///
    /// # Errors
    ///
    /// See [`Forest::update_attributes`].
    pub fn update_attributes(
        &self,
        id: AnimalId,
        patch: Attributes,
    ) -> Result<AnimalNode, AncestryError> {
        let node = self.write().update_attributes(id, patch)?;
        info!(id = %id, "updated animal attributes");
        Ok(node)
    }

    /// Re-parent a node (or make it a root).
    ///
    /// # Errors
    ///
    /// See [`Forest::set_ancestor`].
    pub fn set_ancestor(
        &self,
        id: AnimalId,
        ancestor: Option<AnimalId>,
    ) -> Result<AnimalNode, AncestryError> {
        let node = self.write().set_ancestor(id, ancestor)?;
        info!(id = %id, ancestor = ?ancestor, "moved animal");
        Ok(node)
    }

    /// Store an enrichment result.
    ///
    /// # Errors
    ///
    /// See [`Forest::apply_enrichment`].
    pub fn apply_enrichment(
        &self,
        id: AnimalId,
        enrichment: Enrichment,
    ) -> Result<AnimalNode, AncestryError> {
        let node = self.write().apply_enrichment(id, enrichment)?;
        info!(id = %id, "applied enrichment");
        Ok(node)
    }

    /// Record an enrichment failure.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if the node no longer exists.
    pub fn mark_enrichment_failed(
        &self,
        id: AnimalId,
        reason: &str,
    ) -> Result<AnimalNode, AncestryError> {
        let node = self.write().mark_enrichment_failed(id, reason)?;
        info!(id = %id, reason, "enrichment failed");
        Ok(node)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Every node, in id order.
    #[must_use]
    pub fn get_all(&self) -> Vec<AnimalNode> {
        self.read().iter().cloned().collect()
    }

    /// # Errors
    ///
    /// Returns [`AncestryError::NotFound`] if `id` does not exist.
    pub fn get_by_id(&self, id: AnimalId) -> Result<AnimalNode, AncestryError> {
        self.read().get(id).cloned().ok_or(AncestryError::NotFound(id))
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<AnimalNode> {
        self.read().find_by_name(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    #[must_use]
    pub fn pending_enrichment(&self) -> Vec<EnrichmentRequest> {
        self.read().pending_enrichment()
    }

    /// Project the current node set into nodes and edges.
    #[must_use]
    pub fn project_graph(&self) -> GraphProjection {
        let forest = self.read();
        let graph = project_graph(forest.iter());
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            broken = graph.broken_links.len(),
            "projected graph"
        );
        graph
    }

    /// Lowest common ancestor of two leaf species.
    ///
    /// # Errors
    ///
    /// See [`crate::graph::common_ancestor`].
    pub fn common_ancestor(
        &self,
        a: AnimalId,
        b: AnimalId,
    ) -> Result<CommonAncestor, AncestryError> {
        common_ancestor_with(&*self.read(), a, b, self.lca)
    }

    /// Lineage report for one node.
    ///
    /// # Errors
    ///
    /// See [`crate::graph::lineage`].
    pub fn lineage(&self, id: AnimalId) -> Result<Lineage, AncestryError> {
        lineage(&*self.read(), id)
    }

    /// Nodes whose ancestor was deleted.
    #[must_use]
    pub fn broken_links(&self) -> Vec<BrokenLink> {
        broken_links(&*self.read())
    }
}
