//! Ancestor-chain walk.
//!
//! A chain starts at the origin (distance 0) and follows `ancestor_id` until
//! it reaches a node with no ancestor or a dangling reference. A dangling
//! reference is not an error: the last node reached becomes an effective
//! root and the chain records the missing id.
//!
//! # Cycle guard
//!
//! Writes never commit a cycle, but a corrupt snapshot could contain one.
//! The walk tracks visited ids and fails with [`AncestryError::Cycle`] on
//! the first revisit instead of looping.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::AncestryView;
use crate::error::AncestryError;
use crate::model::AnimalId;

/// One step of an ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    pub id: AnimalId,
    /// Number of upward steps from the origin.
    pub distance: usize,
}

/// Why a chain stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEnd {
    /// The last node declares no ancestor.
    Root,
    /// The last node points at an id that no longer exists.
    Dangling { missing: AnimalId },
}

/// Ordered ancestors of a node, origin first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    links: Vec<ChainLink>,
    end: ChainEnd,
}

impl AncestorChain {
    /// The node the walk started from.
    #[must_use]
    pub fn origin(&self) -> AnimalId {
        self.links[0].id
    }

    /// Every step of the chain, origin first. Never empty.
    #[must_use]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn ids(&self) -> impl Iterator<Item = AnimalId> + '_ {
        self.links.iter().map(|link| link.id)
    }

    /// The topmost node reached (a root or an effective root).
    #[must_use]
    pub fn top(&self) -> AnimalId {
        self.links[self.links.len() - 1].id
    }

    /// Number of upward steps from the origin to [`top`](Self::top).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.links.len() - 1
    }

    #[must_use]
    pub const fn end(&self) -> ChainEnd {
        self.end
    }

    /// Distance from the origin to `id`, if `id` is on the chain.
    #[must_use]
    pub fn distance_to(&self, id: AnimalId) -> Option<usize> {
        self.links
            .iter()
            .find(|link| link.id == id)
            .map(|link| link.distance)
    }

    #[must_use]
    pub fn contains(&self, id: AnimalId) -> bool {
        self.distance_to(id).is_some()
    }
}

/// Walk the ancestor chain of `origin`.
///
/// # Errors
///
/// Returns [`AncestryError::NotFound`] if `origin` does not exist, or
/// [`AncestryError::Cycle`] if the chain revisits an id.
pub fn ancestor_chain<V: AncestryView>(
    view: &V,
    origin: AnimalId,
) -> Result<AncestorChain, AncestryError> {
    let start = view.node(origin).ok_or(AncestryError::NotFound(origin))?;

    let mut links = vec![ChainLink {
        id: origin,
        distance: 0,
    }];
    let mut visited: HashSet<AnimalId> = HashSet::from([origin]);
    let mut next = start.ancestor_id;

    let end = loop {
        let Some(parent_id) = next else {
            break ChainEnd::Root;
        };
        if !visited.insert(parent_id) {
            let mut path: Vec<AnimalId> = links.iter().map(|link| link.id).collect();
            path.push(parent_id);
            return Err(AncestryError::Cycle {
                id: parent_id,
                path,
            });
        }
        let Some(parent) = view.node(parent_id) else {
            break ChainEnd::Dangling { missing: parent_id };
        };
        links.push(ChainLink {
            id: parent_id,
            distance: links.len(),
        });
        next = parent.ancestor_id;
    };

    debug!(origin = %origin, depth = links.len() - 1, ?end, "walked ancestor chain");
    Ok(AncestorChain { links, end })
}

/// Check that making `new_ancestor` the ancestor of `id` keeps the forest
/// acyclic.
///
/// Walks the prospective ancestor's chain and rejects the change if it
/// reaches `id`.
///
/// # Errors
///
/// Returns [`AncestryError::NotFound`] if either node is missing, or
/// [`AncestryError::Cycle`] if the change would close a loop (including
/// `id == new_ancestor`) or the prospective chain is already corrupt.
pub fn check_reparent<V: AncestryView>(
    view: &V,
    id: AnimalId,
    new_ancestor: AnimalId,
) -> Result<(), AncestryError> {
    if !view.contains(id) {
        return Err(AncestryError::NotFound(id));
    }
    if !view.contains(new_ancestor) {
        return Err(AncestryError::NotFound(new_ancestor));
    }
    if id == new_ancestor {
        return Err(AncestryError::Cycle {
            id,
            path: vec![id, id],
        });
    }

    let chain = ancestor_chain(view, new_ancestor)?;
    if chain.contains(id) {
        let mut path = vec![id];
        path.extend(chain.ids().take_while(|&step| step != id));
        path.push(id);
        return Err(AncestryError::Cycle { id, path });
    }
    Ok(())
}

/// One row of a [`Lineage`] report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageItem {
    pub id: AnimalId,
    pub name: String,
    pub ancestor_id: Option<AnimalId>,
    pub depth: usize,
}

/// Family tree of one animal, from itself up to its (effective) root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lineage {
    pub animal_name: String,
    pub total_generations: usize,
    pub lineage: Vec<LineageItem>,
    /// Set when the walk stopped at a dangling reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_link: Option<AnimalId>,
}

/// Build the lineage report for `id`.
///
/// # Errors
///
/// Same as [`ancestor_chain`].
pub fn lineage<V: AncestryView>(view: &V, id: AnimalId) -> Result<Lineage, AncestryError> {
    let chain = ancestor_chain(view, id)?;

    let items: Vec<LineageItem> = chain
        .links()
        .iter()
        .filter_map(|link| {
            view.node(link.id).map(|node| LineageItem {
                id: node.id,
                name: node.name.clone(),
                ancestor_id: node.ancestor_id,
                depth: link.distance,
            })
        })
        .collect();

    let broken_link = match chain.end() {
        ChainEnd::Dangling { missing } => Some(missing),
        ChainEnd::Root => None,
    };

    Ok(Lineage {
        animal_name: items.first().map(|item| item.name.clone()).unwrap_or_default(),
        total_generations: chain.depth(),
        lineage: items,
        broken_link,
    })
}
