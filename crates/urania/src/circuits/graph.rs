//! Major-aspect graph and its connected components ("circuits").

use crate::aspects::{AspectCalculator, AspectKind, AspectTable};
use crate::ephemeris::PositionMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One connected component of the major-aspect graph.
pub type Pattern = BTreeSet<String>;

/// An undirected aspect between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectEdge {
    pub a: String,
    pub b: String,
    pub aspect: AspectKind,
    /// Deviation from the exact angle
    pub orb: f64,
}

impl AspectEdge {
    /// Endpoints in name order.
    pub fn key(&self) -> (&str, &str) {
        ordered(&self.a, &self.b)
    }
}

pub(crate) fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Undirected graph over bodies, one edge per aspected pair.
#[derive(Debug, Clone, Default)]
pub struct AspectGraph {
    graph: UnGraph<String, AspectKind>,
    nodes: HashMap<String, NodeIndex>,
    edges: Vec<AspectEdge>,
}

impl AspectGraph {
    /// Test every unordered pair against the major aspects; the first match wins.
    pub fn build(positions: &PositionMap, table: &AspectTable) -> Self {
        let calculator = AspectCalculator::new();
        let bodies: Vec<(&str, f64)> = positions.iter().collect();
        let mut edges = Vec::new();

        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let (a, lon_a) = bodies[i];
                let (b, lon_b) = bodies[j];
                if let Some(hit) = calculator.major_aspect(lon_a, lon_b, table) {
                    edges.push(AspectEdge {
                        a: a.to_string(),
                        b: b.to_string(),
                        aspect: hit.aspect,
                        orb: hit.orb,
                    });
                }
            }
        }

        log::debug!(
            "Aspect graph: {} bodies, {} major edges",
            bodies.len(),
            edges.len()
        );
        Self::from_edges(edges)
    }

    /// Build from a precomputed edge list.
    pub fn from_edges(edges: Vec<AspectEdge>) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for edge in &edges {
            let ia = *nodes
                .entry(edge.a.clone())
                .or_insert_with(|| graph.add_node(edge.a.clone()));
            let ib = *nodes
                .entry(edge.b.clone())
                .or_insert_with(|| graph.add_node(edge.b.clone()));
            graph.update_edge(ia, ib, edge.aspect);
        }

        Self {
            graph,
            nodes,
            edges,
        }
    }

    pub fn edges(&self) -> &[AspectEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The aspect joining two bodies, if any.
    pub fn aspect_between(&self, a: &str, b: &str) -> Option<AspectKind> {
        let ia = self.nodes.get(a)?;
        let ib = self.nodes.get(b)?;
        let edge = self.graph.find_edge(*ia, *ib)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn has_aspect(&self, a: &str, b: &str, kind: AspectKind) -> bool {
        self.aspect_between(a, b) == Some(kind)
    }

    /// Connected components, ordered by the lowest member longitude.
    pub fn patterns(&self, positions: &PositionMap) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|ix| self.graph[ix].clone())
                    .collect::<Pattern>()
            })
            .filter(|pattern| !pattern.is_empty())
            .collect();

        patterns.sort_by(|x, y| {
            let (lon_x, name_x) = lowest_member(x, positions);
            let (lon_y, name_y) = lowest_member(y, positions);
            lon_x.total_cmp(&lon_y).then_with(|| name_x.cmp(name_y))
        });
        patterns
    }

    /// Canonical text form used for cache keys.
    pub fn signature(&self) -> String {
        let mut keys: Vec<String> = self
            .edges
            .iter()
            .map(|e| {
                let (a, b) = e.key();
                format!("{}-{}:{}", a, b, e.aspect)
            })
            .collect();
        keys.sort();
        keys.join(";")
    }
}

fn lowest_member<'a>(pattern: &'a Pattern, positions: &PositionMap) -> (f64, &'a str) {
    pattern
        .iter()
        .map(|name| (positions.get(name).unwrap_or(f64::MAX), name.as_str()))
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .unwrap_or((f64::MAX, ""))
}

/// Major-aspect circuits of a chart.
pub fn build_patterns(positions: &PositionMap, table: &AspectTable) -> Vec<Pattern> {
    AspectGraph::build(positions, table).patterns(positions)
}
