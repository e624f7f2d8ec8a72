//! `evo graph`: the forest projected into nodes and directed edges for a
//! renderer.

use anyhow::Result;
use clap::Args;
use evograph_core::graph::GraphProjection;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use crate::output::{OutputMode, pretty_section, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct GraphArgs {}

pub fn run_graph(_args: &GraphArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let graph = project.read(|store| Ok(store.project_graph()))?;

    render_mode(
        output,
        &graph,
        |g, w| {
            for node in &g.nodes {
                writeln!(w, "node\t{}\t{}", node.id, node.label)?;
            }
            for edge in &g.edges {
                writeln!(w, "edge\t{}\t{}", edge.from, edge.to)?;
            }
            for link in &g.broken_links {
                writeln!(w, "broken\t{}\t{}", link.id, link.missing_ancestor)?;
            }
            Ok(())
        },
        pretty_tree,
    )
}

/// Indented outline: every root (declared or effective) with its
/// descendants underneath.
fn pretty_tree(graph: &GraphProjection, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!("Graph ({} nodes, {} edges)", graph.node_count(), graph.edge_count()),
    )?;

    let mut children: HashMap<_, Vec<usize>> = HashMap::new();
    for edge in &graph.edges {
        if let Some(idx) = graph.nodes.iter().position(|n| n.id == edge.to) {
            children.entry(edge.from).or_default().push(idx);
        }
    }
    let is_child = |id| graph.edges.iter().any(|e| e.to == id);

    let mut stack: Vec<(usize, usize)> = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| !is_child(n.id))
        .map(|(idx, _)| (idx, 0))
        .rev()
        .collect();

    while let Some((idx, depth)) = stack.pop() {
        let node = &graph.nodes[idx];
        let broken = graph
            .broken_links
            .iter()
            .any(|link| link.id == node.id);
        let marker = if broken { " (broken link)" } else { "" };
        writeln!(w, "{}#{} {}{marker}", "  ".repeat(depth), node.id, node.label)?;
        if let Some(kids) = children.get(&node.id) {
            stack.extend(kids.iter().rev().map(|&kid| (kid, depth + 1)));
        }
    }
    Ok(())
}
