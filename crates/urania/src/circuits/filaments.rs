//! Minor-aspect filaments between circuits and singleton bodies.

use crate::aspects::{AspectCalculator, AspectKind, AspectTable};
use crate::circuits::graph::{AspectEdge, Pattern};
use crate::ephemeris::PositionMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A minor aspect joining two bodies, tagged with each endpoint's circuit index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    pub a: String,
    pub b: String,
    pub aspect: AspectKind,
    pub pattern_a: usize,
    pub pattern_b: usize,
}

impl Filament {
    pub fn crosses_patterns(&self) -> bool {
        self.pattern_a != self.pattern_b
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinorLinks {
    pub filaments: Vec<Filament>,
    /// Unaspected body -> synthetic index (numbered after the patterns)
    pub singletons: BTreeMap<String, usize>,
}

/// Find minor-aspect filaments across the whole chart.
///
/// Every body gets an index: its pattern's position in `patterns`, or a
/// singleton index starting at `patterns.len()` in ascending-longitude order.
pub fn detect_minor_links(
    positions: &PositionMap,
    patterns: &[Pattern],
    table: &AspectTable,
) -> MinorLinks {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for (idx, pattern) in patterns.iter().enumerate() {
        for body in pattern {
            index_of.insert(body.as_str(), idx);
        }
    }

    let mut singletons = BTreeMap::new();
    let mut next = patterns.len();
    for name in positions.names_by_longitude() {
        if !index_of.contains_key(name) {
            singletons.insert(name.to_string(), next);
            index_of.insert(name, next);
            next += 1;
        }
    }

    let calculator = AspectCalculator::new();
    let bodies: Vec<(&str, f64)> = positions.iter().collect();
    let mut filaments = Vec::new();

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, lon_a) = bodies[i];
            let (b, lon_b) = bodies[j];
            let Some(hit) = calculator.calculate_aspect(lon_a, lon_b, table, &AspectKind::MINOR_LINKS)
            else {
                continue;
            };
            if let (Some(&pattern_a), Some(&pattern_b)) = (index_of.get(a), index_of.get(b)) {
                filaments.push(Filament {
                    a: a.to_string(),
                    b: b.to_string(),
                    aspect: hit.aspect,
                    pattern_a,
                    pattern_b,
                });
            }
        }
    }

    log::debug!(
        "Minor links: {} filaments, {} singletons",
        filaments.len(),
        singletons.len()
    );

    MinorLinks {
        filaments,
        singletons,
    }
}

/// Group pattern/singleton indices joined by cross-pattern filaments.
pub fn generate_combo_groups(filaments: &[Filament]) -> Vec<Vec<usize>> {
    let mut graph: UnGraphMap<usize, ()> = UnGraphMap::new();
    for filament in filaments.iter().filter(|f| f.crosses_patterns()) {
        graph.add_edge(filament.pattern_a, filament.pattern_b, ());
    }

    let mut groups: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|group| group.len() > 1)
        .map(|mut group| {
            group.sort_unstable();
            group
        })
        .collect();
    groups.sort();
    groups
}

/// Minor-aspect edges between members of a single pattern.
pub fn internal_minor_edges(
    positions: &PositionMap,
    members: &Pattern,
    table: &AspectTable,
) -> Vec<AspectEdge> {
    let calculator = AspectCalculator::new();
    let bodies: Vec<(&str, f64)> = members
        .iter()
        .filter_map(|m| positions.get(m).map(|lon| (m.as_str(), lon)))
        .collect();

    let mut edges = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, lon_a) = bodies[i];
            let (b, lon_b) = bodies[j];
            if let Some(hit) =
                calculator.calculate_aspect(lon_a, lon_b, table, &AspectKind::MINOR_LINKS)
            {
                edges.push(AspectEdge {
                    a: a.to_string(),
                    b: b.to_string(),
                    aspect: hit.aspect,
                    orb: hit.orb,
                });
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filament(pattern_a: usize, pattern_b: usize) -> Filament {
        Filament {
            a: "x".into(),
            b: "y".into(),
            aspect: AspectKind::Quincunx,
            pattern_a,
            pattern_b,
        }
    }

    #[test]
    fn test_combo_groups_ignore_intra_pattern_links() {
        let groups = generate_combo_groups(&[
            filament(0, 0),
            filament(3, 1),
            filament(1, 2),
            filament(4, 5),
        ]);
        assert_eq!(groups, vec![vec![1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_combo_groups_empty_when_no_cross_links() {
        assert!(generate_combo_groups(&[filament(2, 2)]).is_empty());
    }
}
