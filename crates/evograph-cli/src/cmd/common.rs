//! `evo common`: lowest common ancestor of two leaf species.

use anyhow::Result;
use clap::Args;
use evograph_core::graph::CommonAncestor;
use evograph_core::{AnimalId, AnimalNode};
use serde::Serialize;
use std::path::Path;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::project::Project;

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// First species id.
    pub first: AnimalId,

    /// Second species id.
    pub second: AnimalId,
}

/// Response shape of the common-ancestor query.
#[derive(Debug, Serialize)]
struct CommonReport {
    common_ancestor: AnimalNode,
    animal1_distance: usize,
    animal2_distance: usize,
    total_distance: usize,
}

impl From<CommonAncestor> for CommonReport {
    fn from(result: CommonAncestor) -> Self {
        Self {
            common_ancestor: result.ancestor,
            animal1_distance: result.distance_a,
            animal2_distance: result.distance_b,
            total_distance: result.total_distance,
        }
    }
}

pub fn run_common(args: &CommonArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = Project::open(project_root)?;
    let report: CommonReport = project
        .read(|store| Ok(store.common_ancestor(args.first, args.second)?))?
        .into();

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                r.common_ancestor.id,
                r.common_ancestor.name,
                r.animal1_distance,
                r.animal2_distance,
                r.total_distance
            )
        },
        |r, w| {
            pretty_section(w, "Common ancestor")?;
            pretty_kv(
                w,
                "Ancestor",
                format!("#{} {}", r.common_ancestor.id, r.common_ancestor.name),
            )?;
            pretty_kv(w, "From first", format!("{} step(s)", r.animal1_distance))?;
            pretty_kv(w, "From second", format!("{} step(s)", r.animal2_distance))?;
            pretty_kv(w, "Total", format!("{} step(s)", r.total_distance))
        },
    )
}
