//! Lowest Common Ancestor (LCA) of two leaf species.
//!
//! Given two leaves, the LCA is the closest node shared by both ancestor
//! chains. The result also reports how many steps each leaf is from that
//! node and the total path length between the leaves.
//!
//! # Algorithm
//!
//! Every connected component is a simple rooted tree, so intersecting the
//! two ancestor chains is enough: walk both chains, index B's chain by id,
//! then take the first node of A's chain (by distance from A) that B's chain
//! also contains. Each chain holds an id at most once, so there are no ties.
//! Runs in O(depth_a + depth_b).
//!
//! # Edge Cases
//!
//! - If one endpoint is an ancestor of the other, that endpoint **is** the
//!   LCA (distance 0 on its side).
//! - Identical endpoints are rejected as an invalid query.
//! - Disjoint trees, or a chain that stops at a dangling link before the
//!   two meet, produce [`AncestryError::NoCommonAncestor`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::AncestryView;
use super::chain::ancestor_chain;
use crate::error::AncestryError;
use crate::model::{AnimalId, AnimalNode};

/// Result of a common-ancestor query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonAncestor {
    pub ancestor: AnimalNode,
    /// Steps from the first endpoint up to `ancestor`.
    pub distance_a: usize,
    /// Steps from the second endpoint up to `ancestor`.
    pub distance_b: usize,
    /// `distance_a + distance_b`: the path length between the endpoints.
    pub total_distance: usize,
}

/// Eligibility rules for query endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcaOptions {
    /// Reject endpoints that are not leaf species.
    pub require_leaf_endpoints: bool,
}

impl Default for LcaOptions {
    fn default() -> Self {
        Self {
            require_leaf_endpoints: true,
        }
    }
}

/// Find the lowest common ancestor of two leaf species.
///
/// # Errors
///
/// - [`AncestryError::NotFound`] if either id does not resolve.
/// - [`AncestryError::InvalidQuery`] if the ids are identical or an endpoint
///   is not a leaf species.
/// - [`AncestryError::Cycle`] if either chain is corrupt.
/// - [`AncestryError::NoCommonAncestor`] if the chains never intersect.
pub fn common_ancestor<V: AncestryView>(
    view: &V,
    a: AnimalId,
    b: AnimalId,
) -> Result<CommonAncestor, AncestryError> {
    common_ancestor_with(view, a, b, LcaOptions::default())
}

/// [`common_ancestor`] with explicit eligibility options.
///
/// # Errors
///
/// See [`common_ancestor`].
pub fn common_ancestor_with<V: AncestryView>(
    view: &V,
    a: AnimalId,
    b: AnimalId,
    options: LcaOptions,
) -> Result<CommonAncestor, AncestryError> {
    let node_a = view.node(a).ok_or(AncestryError::NotFound(a))?;
    let node_b = view.node(b).ok_or(AncestryError::NotFound(b))?;

    if a == b {
        return Err(AncestryError::InvalidQuery(
            "both ids are the same; select two different animals".to_string(),
        ));
    }
    if options.require_leaf_endpoints {
        for node in [node_a, node_b] {
            if !node.is_leaf() {
                return Err(AncestryError::InvalidQuery(format!(
                    "'{}' (id={}) is a taxon, not a leaf species",
                    node.name, node.id
                )));
            }
        }
    }

    let chain_a = ancestor_chain(view, a)?;
    let chain_b = ancestor_chain(view, b)?;
    let depth_in_b: HashMap<AnimalId, usize> = chain_b
        .links()
        .iter()
        .map(|link| (link.id, link.distance))
        .collect();

    let (lca_id, distance_a, distance_b) = chain_a
        .links()
        .iter()
        .find_map(|link| {
            depth_in_b
                .get(&link.id)
                .map(|&distance_b| (link.id, link.distance, distance_b))
        })
        .ok_or(AncestryError::NoCommonAncestor { a, b })?;

    let ancestor = view
        .node(lca_id)
        .cloned()
        .ok_or(AncestryError::NotFound(lca_id))?;

    debug!(%a, %b, lca = %lca_id, distance_a, distance_b, "found common ancestor");
    Ok(CommonAncestor {
        ancestor,
        distance_a,
        distance_b,
        total_distance: distance_a + distance_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{forest, id};

    #[test]
    fn lion_and_tiger_share_mammalia() {
        let view = forest(&[
            (1, "Mammalia", None, None),
            (2, "Lion", Some(1), Some("Panthera leo")),
            (3, "Tiger", Some(1), Some("Panthera tigris")),
        ]);
        let result = common_ancestor(&view, id(2), id(3)).unwrap();
        assert_eq!(result.ancestor.id, id(1));
        assert_eq!(result.distance_a, 1);
        assert_eq!(result.distance_b, 1);
        assert_eq!(result.total_distance, 2);
    }

    #[test]
    fn lca_asymmetric_depth() {
        //  1 → 2 → 3 → 4 → lion(5)
        //   \→ shark(6)
        let view = forest(&[
            (1, "Animalia", None, None),
            (2, "Chordata", Some(1), None),
            (3, "Mammalia", Some(2), None),
            (4, "Felidae", Some(3), None),
            (5, "Lion", Some(4), Some("Panthera leo")),
            (6, "Sponge", Some(1), Some("Porifera sp.")),
        ]);
        let result = common_ancestor(&view, id(5), id(6)).unwrap();
        assert_eq!(result.ancestor.id, id(1));
        assert_eq!(result.distance_a, 4);
        assert_eq!(result.distance_b, 1);
        assert_eq!(result.total_distance, 5);
    }

    #[test]
    fn lca_is_symmetric() {
        let view = forest(&[
            (1, "Mammalia", None, None),
            (2, "Felidae", Some(1), None),
            (3, "Lion", Some(2), Some("Panthera leo")),
            (4, "Wolf", Some(1), Some("Canis lupus")),
        ]);
        let ab = common_ancestor(&view, id(3), id(4)).unwrap();
        let ba = common_ancestor(&view, id(4), id(3)).unwrap();
        assert_eq!(ab.ancestor, ba.ancestor);
        assert_eq!(ab.distance_a, ba.distance_b);
        assert_eq!(ab.distance_b, ba.distance_a);
        assert_eq!(ab.total_distance, ba.total_distance);
    }

    #[test]
    fn endpoint_that_is_ancestor_of_the_other_is_the_lca() {
        // A leaf that later gained descendants (a subspecies).
        let view = forest(&[
            (1, "Felidae", None, None),
            (2, "Lion", Some(1), Some("Panthera leo")),
            (3, "Asiatic Lion", Some(2), Some("Panthera leo persica")),
        ]);
        let result = common_ancestor(&view, id(3), id(2)).unwrap();
        assert_eq!(result.ancestor.id, id(2));
        assert_eq!(result.distance_a, 1);
        assert_eq!(result.distance_b, 0);
    }

    #[test]
    fn identical_endpoints_are_invalid() {
        let view = forest(&[(1, "Lion", None, Some("Panthera leo"))]);
        assert!(matches!(
            common_ancestor(&view, id(1), id(1)),
            Err(AncestryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn unknown_endpoint_is_not_found() {
        let view = forest(&[(1, "Lion", None, Some("Panthera leo"))]);
        assert_eq!(
            common_ancestor(&view, id(1), id(9)),
            Err(AncestryError::NotFound(id(9)))
        );
        assert_eq!(
            common_ancestor(&view, id(9), id(9)),
            Err(AncestryError::NotFound(id(9)))
        );
    }

    #[test]
    fn taxon_endpoint_is_rejected_unless_allowed() {
        let view = forest(&[
            (1, "Carnivora", None, None),
            (2, "Felidae", Some(1), None),
            (3, "Canidae", Some(1), None),
        ]);
        assert!(matches!(
            common_ancestor(&view, id(2), id(3)),
            Err(AncestryError::InvalidQuery(_))
        ));

        let relaxed = LcaOptions {
            require_leaf_endpoints: false,
        };
        let result = common_ancestor_with(&view, id(2), id(3), relaxed).unwrap();
        assert_eq!(result.ancestor.id, id(1));
    }

    #[test]
    fn disjoint_roots_have_no_common_ancestor() {
        let view = forest(&[
            (1, "Animalia", None, None),
            (2, "Plantae", None, None),
            (3, "Lion", Some(1), Some("Panthera leo")),
            (4, "Oak", Some(2), Some("Quercus robur")),
        ]);
        assert_eq!(
            common_ancestor(&view, id(3), id(4)),
            Err(AncestryError::NoCommonAncestor { a: id(3), b: id(4) })
        );
    }

    #[test]
    fn dangling_link_before_meeting_means_no_common_ancestor() {
        // Felidae (2) was deleted; Lion now dangles below it.
        let view = forest(&[
            (1, "Mammalia", None, None),
            (3, "Lion", Some(2), Some("Panthera leo")),
            (4, "Wolf", Some(1), Some("Canis lupus")),
        ]);
        assert!(matches!(
            common_ancestor(&view, id(3), id(4)),
            Err(AncestryError::NoCommonAncestor { .. })
        ));
    }

    #[test]
    fn corrupt_chain_fails_with_cycle() {
        let view = forest(&[
            (1, "A", Some(2), None),
            (2, "B", Some(1), None),
            (3, "Lion", Some(1), Some("Panthera leo")),
            (4, "Tiger", Some(2), Some("Panthera tigris")),
        ]);
        assert!(matches!(
            common_ancestor(&view, id(3), id(4)),
            Err(AncestryError::Cycle { .. })
        ));
    }
}
