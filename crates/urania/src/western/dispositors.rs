//! Dispositor graphs: who rules whom, by sign and by house cusp.
//!
//! Each body is ruled by the ruler(s) of the sign it occupies (or of the sign
//! on the cusp of the house it occupies). Rulers absent from the chart are
//! ignored; a body with no ruler present rules itself.

use crate::ephemeris::PositionMap;
use crate::western::houses::{house_of_degree, valid_cusps};
use crate::western::rulers::{sign_index, sign_rulers, RulershipScheme};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Directed rulership edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DispositorLink {
    pub ruler: String,
    pub ruled: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispositorResult {
    /// Ruler -> ruled edges, self-rulership excluded
    pub raw_links: Vec<DispositorLink>,
    /// Bodies not ruled by any other body
    pub sovereigns: Vec<String>,
    pub self_ruling: Vec<String>,
    /// Bodies ruling three or more others
    pub dominant_rulers: Vec<String>,
    /// Bodies that are ruled but rule nothing
    pub final_dispositors: Vec<String>,
    /// Rulership cycles, each starting at its lowest-named member
    pub loops: Vec<Vec<String>>,
}

impl DispositorResult {
    pub fn is_empty(&self) -> bool {
        self.raw_links.is_empty() && self.sovereigns.is_empty() && self.self_ruling.is_empty()
    }

    pub fn in_loop(&self, body: &str) -> bool {
        self.loops.iter().any(|l| l.iter().any(|m| m == body))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispositorAnalysis {
    pub by_sign: DispositorResult,
    /// Empty when no valid 12-cusp array was supplied
    pub by_house: DispositorResult,
}

/// Rulership edges for every body, with self-loops for bodies lacking a present ruler.
fn rulership_edges<F>(positions: &PositionMap, scheme: RulershipScheme, sign_of: F) -> Vec<(String, String)>
where
    F: Fn(f64) -> usize,
{
    let mut by_lowercase: HashMap<String, &str> = HashMap::new();
    for name in positions.names() {
        by_lowercase.entry(name.to_lowercase()).or_insert(name);
    }

    let mut edges = Vec::new();
    for (body, lon) in positions.iter() {
        let mut rulers: Vec<&str> = sign_rulers(sign_of(lon), scheme)
            .iter()
            .filter_map(|r| by_lowercase.get(*r).copied())
            .collect();
        rulers.dedup();
        if rulers.is_empty() {
            edges.push((body.to_string(), body.to_string()));
        }
        for ruler in rulers {
            edges.push((ruler.to_string(), body.to_string()));
        }
    }
    edges
}

/// Simple cycles through `start` that only visit nodes named after it.
fn cycles_from<'a>(
    start: &'a str,
    node: &'a str,
    adjacency: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    allowed: &HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    out: &mut Vec<Vec<String>>,
) {
    let Some(next) = adjacency.get(node) else {
        return;
    };
    for &child in next {
        if child == start {
            if path.len() >= 2 {
                out.push(path.iter().map(|s| s.to_string()).collect());
            }
        } else if child > start && allowed.contains(child) && !path.contains(&child) {
            path.push(child);
            cycles_from(start, child, adjacency, allowed, path, out);
            path.pop();
        }
    }
}

fn classify(bodies: Vec<&str>, edges: Vec<(String, String)>) -> DispositorResult {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();
    for body in bodies {
        index
            .entry(body.to_string())
            .or_insert_with(|| graph.add_node(body.to_string()));
    }

    let mut self_ruling = BTreeSet::new();
    let mut raw_links = BTreeSet::new();
    for (ruler, ruled) in edges {
        if ruler == ruled {
            self_ruling.insert(ruler);
            continue;
        }
        let (Some(&r), Some(&b)) = (index.get(&ruler), index.get(&ruled)) else {
            continue;
        };
        graph.update_edge(r, b, ());
        raw_links.insert(DispositorLink { ruler, ruled });
    }

    let mut sovereigns = Vec::new();
    let mut dominant_rulers = Vec::new();
    let mut final_dispositors = Vec::new();
    for ix in graph.node_indices() {
        let out_degree = graph.neighbors_directed(ix, Direction::Outgoing).count();
        let in_degree = graph.neighbors_directed(ix, Direction::Incoming).count();
        let name = graph[ix].clone();
        if in_degree == 0 {
            sovereigns.push(name.clone());
        }
        if out_degree >= 3 {
            dominant_rulers.push(name.clone());
        }
        if out_degree == 0 && in_degree >= 1 {
            final_dispositors.push(name);
        }
    }
    sovereigns.sort();
    dominant_rulers.sort();
    final_dispositors.sort();

    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for link in &raw_links {
        adjacency
            .entry(link.ruler.as_str())
            .or_default()
            .insert(link.ruled.as_str());
    }
    let mut loops = Vec::new();
    for component in tarjan_scc(&graph).into_iter().filter(|c| c.len() > 1) {
        let mut members: Vec<&str> = component.iter().map(|ix| graph[*ix].as_str()).collect();
        members.sort_unstable();
        let allowed: HashSet<&str> = members.iter().copied().collect();
        for &start in &members {
            let mut path = vec![start];
            cycles_from(start, start, &adjacency, &allowed, &mut path, &mut loops);
        }
    }
    loops.sort();

    DispositorResult {
        raw_links: raw_links.into_iter().collect(),
        sovereigns,
        self_ruling: self_ruling.into_iter().collect(),
        dominant_rulers,
        final_dispositors,
        loops,
    }
}

/// Sign-based rulership for every body.
pub fn analyze_by_sign(positions: &PositionMap, scheme: RulershipScheme) -> DispositorResult {
    let edges = rulership_edges(positions, scheme, sign_index);
    classify(positions.names().collect(), edges)
}

/// House-cusp rulership; empty for anything but 12 finite cusps.
pub fn analyze_by_house(positions: &PositionMap, cusps: &[f64], scheme: RulershipScheme) -> DispositorResult {
    if !valid_cusps(cusps) {
        log::debug!("Skipping house dispositors: {} cusps supplied", cusps.len());
        return DispositorResult::default();
    }
    let edges = rulership_edges(positions, scheme, |lon| {
        let house = house_of_degree(lon, cusps).unwrap_or(1);
        sign_index(cusps[house - 1])
    });
    classify(positions.names().collect(), edges)
}

/// Sign and house dispositor graphs for a chart.
pub fn analyze(positions: &PositionMap, cusps: Option<&[f64]>, scheme: RulershipScheme) -> DispositorAnalysis {
    let by_sign = analyze_by_sign(positions, scheme);
    let by_house = cusps
        .map(|c| analyze_by_house(positions, c, scheme))
        .unwrap_or_default();
    log::debug!(
        "Dispositors: {} sign links, {} house links, {} loops",
        by_sign.raw_links.len(),
        by_house.raw_links.len(),
        by_sign.loops.len()
    );
    DispositorAnalysis { by_sign, by_house }
}

/// One house-based result per named house system.
pub fn analyze_across_systems(
    positions: &PositionMap,
    cusps_by_system: &BTreeMap<String, Vec<f64>>,
    scheme: RulershipScheme,
) -> BTreeMap<String, DispositorResult> {
    cusps_by_system
        .iter()
        .map(|(system, cusps)| (system.clone(), analyze_by_house(positions, cusps, scheme)))
        .collect()
}

fn walk_chains<'a>(
    node: &'a str,
    children: &BTreeMap<&'a str, Vec<&'a str>>,
    path: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<Vec<String>>,
) {
    path.push(node);
    visited.insert(node);
    match children.get(node) {
        Some(next) if !next.is_empty() => {
            for &child in next {
                if path.contains(&child) {
                    let mut closed: Vec<String> = path.iter().map(|s| s.to_string()).collect();
                    closed.push(child.to_string());
                    out.push(closed);
                } else {
                    walk_chains(child, children, path, visited, out);
                }
            }
        }
        _ => out.push(path.iter().map(|s| s.to_string()).collect()),
    }
    path.pop();
}

/// Ruler -> ruled paths from each sovereign, then from loops no sovereign reaches.
///
/// A path ends at a body that rules nothing, or repeats the node that closes a loop.
pub fn rulership_chains(result: &DispositorResult) -> Vec<Vec<String>> {
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for link in &result.raw_links {
        children
            .entry(link.ruler.as_str())
            .or_default()
            .push(link.ruled.as_str());
    }

    let mut chains = Vec::new();
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    for sovereign in &result.sovereigns {
        walk_chains(sovereign, &children, &mut path, &mut visited, &mut chains);
    }
    for cycle in &result.loops {
        if let Some(head) = cycle.first() {
            if !visited.contains(head.as_str()) {
                walk_chains(head, &children, &mut path, &mut visited, &mut chains);
            }
        }
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(bodies: &[(&str, f64)]) -> PositionMap {
        bodies.iter().map(|(n, l)| (*n, *l)).collect()
    }

    #[test]
    fn test_ruler_names_match_case_insensitively() {
        // Moon in Aries is ruled by Mars
        let positions = chart(&[("Moon", 10.0), ("Mars", 200.0)]);
        let result = analyze_by_sign(&positions, RulershipScheme::Traditional);
        assert!(result.raw_links.contains(&DispositorLink {
            ruler: "Mars".into(),
            ruled: "Moon".into(),
        }));
    }

    #[test]
    fn test_two_body_loop() {
        // Venus in Aries (ruled by Mars), Mars in Libra (ruled by Venus)
        let positions = chart(&[("Venus", 15.0), ("Mars", 190.0)]);
        let result = analyze_by_sign(&positions, RulershipScheme::Traditional);
        assert_eq!(result.loops, vec![vec!["Mars".to_string(), "Venus".to_string()]]);
        assert!(result.sovereigns.is_empty());
        assert!(result.in_loop("Venus"));

        let chains = rulership_chains(&result);
        assert_eq!(chains, vec![vec!["Mars", "Venus", "Mars"]]);
    }

    #[test]
    fn test_dominant_and_final() {
        // Mercury rules the Gemini bodies; Jupiter rules Mercury back
        let positions = chart(&[
            ("Jupiter", 70.0),
            ("Mercury", 250.0),
            ("Sun", 75.0),
            ("Moon", 80.0),
            ("Venus", 65.0),
        ]);
        let result = analyze_by_sign(&positions, RulershipScheme::Traditional);
        assert_eq!(result.dominant_rulers, vec!["Mercury"]);
        assert!(result.loops.contains(&vec!["Jupiter".to_string(), "Mercury".to_string()]));
        assert_eq!(result.final_dispositors, vec!["Moon", "Sun", "Venus"]);
    }
}
