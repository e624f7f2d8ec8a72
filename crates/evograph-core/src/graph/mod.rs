//! Ancestor query engine.
//!
//! Stateless algorithms over a read-only view of the forest. Nothing here
//! mutates state or performs I/O, so every function can run concurrently
//! with any other read.
//!
//! ## Submodules
//!
//! - [`chain`]: ancestor-chain walk, lineage report, and the write-time
//!   cycle check used when an ancestor is set.
//! - [`lca`]: lowest common ancestor of two leaf species with distances.
//! - [`projection`]: flat node set to renderable nodes + directed edges.

use std::collections::{BTreeMap, HashMap};

use crate::model::{AnimalId, AnimalNode};

pub mod chain;
pub mod lca;
pub mod projection;

pub use chain::{AncestorChain, ChainEnd, ChainLink, Lineage, LineageItem, ancestor_chain, lineage};
pub use lca::{CommonAncestor, LcaOptions, common_ancestor, common_ancestor_with};
pub use projection::{BrokenLink, GraphEdge, GraphNode, GraphProjection, NodeKind, broken_links, project_graph};

/// Read-only access to a set of animal nodes keyed by id.
///
/// The engine depends only on this trait, never on the store itself.
pub trait AncestryView {
    /// Look up a node by id.
    fn node(&self, id: AnimalId) -> Option<&AnimalNode>;

    /// Iterate every node. Order is not significant.
    fn nodes(&self) -> impl Iterator<Item = &AnimalNode>;

    /// Returns `true` if `id` resolves to a node.
    fn contains(&self, id: AnimalId) -> bool {
        self.node(id).is_some()
    }
}

impl AncestryView for BTreeMap<AnimalId, AnimalNode> {
    fn node(&self, id: AnimalId) -> Option<&AnimalNode> {
        self.get(&id)
    }

    fn nodes(&self) -> impl Iterator<Item = &AnimalNode> {
        self.values()
    }
}

impl AncestryView for HashMap<AnimalId, AnimalNode> {
    fn node(&self, id: AnimalId) -> Option<&AnimalNode> {
        self.get(&id)
    }

    fn nodes(&self) -> impl Iterator<Item = &AnimalNode> {
        self.values()
    }
}
