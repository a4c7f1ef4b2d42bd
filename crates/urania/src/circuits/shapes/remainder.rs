//! Major edges left over after shape detection.

use crate::aspects::AspectKind;
use crate::circuits::cluster::ClusterId;
use crate::circuits::graph::{AspectGraph, Pattern};
use crate::circuits::shapes::detector::{MatchMode, RepContext};
use crate::circuits::shapes::types::{Shape, ShapeKind};
use crate::config::Settings;
use crate::ephemeris::PositionMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;

/// Group each pattern's unused representative-level edges into `Remainder` shapes.
pub(crate) fn remainder_shapes(
    positions: &PositionMap,
    graph: &AspectGraph,
    settings: &Settings,
    patterns: &[Pattern],
    shapes: &[Shape],
    mut next_id: usize,
) -> Vec<Shape> {
    let mut remainders = Vec::new();

    for (idx, pattern) in patterns.iter().enumerate() {
        let ctx = RepContext::new(
            positions,
            graph,
            settings,
            pattern.iter().map(String::as_str),
            MatchMode::Strict,
        );

        let mut used: HashSet<(ClusterId, ClusterId, AspectKind)> = HashSet::new();
        for edge in shapes.iter().flat_map(|s| s.edges.iter()) {
            let clusters = &ctx.clusters;
            if let (Some(a), Some(b)) = (clusters.rep_of(&edge.a), clusters.rep_of(&edge.b)) {
                used.insert((a.min(b), a.max(b), edge.aspect));
            }
        }

        let leftover: Vec<(ClusterId, ClusterId, AspectKind)> = ctx
            .rep_edges()
            .into_iter()
            .filter(|edge| !used.contains(edge))
            .collect();
        if leftover.is_empty() {
            continue;
        }

        let mut component_graph: UnGraphMap<ClusterId, ()> = UnGraphMap::new();
        for (a, b, _) in &leftover {
            component_graph.add_edge(*a, *b, ());
        }
        let mut components: Vec<Vec<ClusterId>> = tarjan_scc(&component_graph)
            .into_iter()
            .map(|mut nodes| {
                nodes.sort();
                nodes
            })
            .collect();
        components.sort();

        for nodes in components {
            let edges = leftover
                .iter()
                .filter(|(a, b, _)| nodes.contains(a) && nodes.contains(b))
                .map(|(a, b, kind)| ctx.shape_edge(*a, *b, *kind))
                .collect();
            remainders.push(Shape {
                id: next_id,
                kind: ShapeKind::Remainder,
                parent: idx,
                members: ctx.clusters.expand(&nodes),
                edges,
                approx: false,
                remainder: true,
                suppresses: None,
            });
            next_id += 1;
        }
    }

    if !remainders.is_empty() {
        log::trace!("{} remainder groups", remainders.len());
    }
    remainders
}
