//! Flat node set → renderable graph (nodes + directed edges).
//!
//! One graph node per animal, one edge `ancestor_id → id` for every animal
//! whose ancestor is present in the same set. Dangling ancestors produce no
//! edge; they are listed as broken links instead. Output is sorted by id so
//! repeated calls on the same input are byte-for-byte identical.

use std::collections::HashSet;

use serde::Serialize;

use super::AncestryView;
use crate::model::{AnimalId, AnimalNode, EnrichmentStatus};

/// Leaf species vs intermediate taxon, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Species,
    Taxon,
}

/// Display record for one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: AnimalId,
    pub label: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub enrichment: EnrichmentStatus,
}

/// Directed edge from ancestor to descendant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: AnimalId,
    pub to: AnimalId,
}

/// A node whose `ancestor_id` no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub id: AnimalId,
    pub name: String,
    pub missing_ancestor: AnimalId,
}

/// The whole forest shaped for a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphProjection {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub broken_links: Vec<BrokenLink>,
}

impl GraphProjection {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<&AnimalNode> for GraphNode {
    fn from(animal: &AnimalNode) -> Self {
        Self {
            id: animal.id,
            label: animal.name.clone(),
            kind: if animal.is_leaf() {
                NodeKind::Species
            } else {
                NodeKind::Taxon
            },
            scientific_name: animal.attributes.scientific_name.clone(),
            taxonomy_class: animal.attributes.taxonomy_class.clone(),
            image_url: animal.attributes.image_url.clone(),
            enrichment: animal.enrichment.clone(),
        }
    }
}

/// Project a flat set of animals into nodes and edges. Pure.
pub fn project_graph<'a, I>(animals: I) -> GraphProjection
where
    I: IntoIterator<Item = &'a AnimalNode>,
{
    let mut animals: Vec<&AnimalNode> = animals.into_iter().collect();
    animals.sort_by_key(|animal| animal.id);
    let present: HashSet<AnimalId> = animals.iter().map(|animal| animal.id).collect();

    let mut projection = GraphProjection {
        nodes: animals.iter().map(|&animal| GraphNode::from(animal)).collect(),
        ..GraphProjection::default()
    };

    for animal in &animals {
        let Some(ancestor) = animal.ancestor_id else {
            continue;
        };
        if present.contains(&ancestor) {
            projection.edges.push(GraphEdge {
                id: format!("e-{ancestor}-{}", animal.id),
                from: ancestor,
                to: animal.id,
            });
        } else {
            projection.broken_links.push(BrokenLink {
                id: animal.id,
                name: animal.name.clone(),
                missing_ancestor: ancestor,
            });
        }
    }

    projection
}

/// Every node whose ancestor reference dangles, sorted by id.
pub fn broken_links<V: AncestryView>(view: &V) -> Vec<BrokenLink> {
    let mut links: Vec<BrokenLink> = view
        .nodes()
        .filter_map(|animal| {
            let missing = animal.ancestor_id?;
            (!view.contains(missing)).then(|| BrokenLink {
                id: animal.id,
                name: animal.name.clone(),
                missing_ancestor: missing,
            })
        })
        .collect();
    links.sort_by_key(|link| link.id);
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{forest, id};

    #[test]
    fn edges_point_from_ancestor_to_descendant() {
        let view = forest(&[
            (1, "Mammalia", None, None),
            (2, "Lion", Some(1), Some("Panthera leo")),
            (3, "Tiger", Some(1), Some("Panthera tigris")),
        ]);
        let graph = project_graph(view.values());

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges[0].from, id(1));
        assert_eq!(graph.edges[0].to, id(2));
        assert_eq!(graph.edges[0].id, "e-1-2");
        assert!(graph.broken_links.is_empty());
        assert_eq!(graph.nodes[0].kind, NodeKind::Taxon);
        assert_eq!(graph.nodes[1].kind, NodeKind::Species);
    }

    #[test]
    fn dangling_ancestor_keeps_node_but_drops_edge() {
        let view = forest(&[
            (2, "Felidae", Some(1), None),
            (3, "Lion", Some(2), Some("Panthera leo")),
        ]);
        let graph = project_graph(view.values());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.broken_links,
            vec![BrokenLink {
                id: id(2),
                name: "Felidae".into(),
                missing_ancestor: id(1),
            }]
        );
    }

    #[test]
    fn projection_is_deterministic_regardless_of_input_order() {
        let view = forest(&[
            (1, "Mammalia", None, None),
            (2, "Lion", Some(1), Some("Panthera leo")),
            (3, "Tiger", Some(1), Some("Panthera tigris")),
        ]);
        let forward = project_graph(view.values());
        let backward = project_graph(view.values().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward, project_graph(view.values()));
    }

    #[test]
    fn empty_input_projects_empty_graph() {
        let graph = project_graph(std::iter::empty());
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn broken_links_scans_view() {
        let view = forest(&[
            (1, "Mammalia", None, None),
            (4, "Wolf", Some(3), Some("Canis lupus")),
            (5, "Lion", Some(1), Some("Panthera leo")),
        ]);
        let links = broken_links(&view);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, id(4));
        assert_eq!(links[0].missing_ancestor, id(3));
    }
}
