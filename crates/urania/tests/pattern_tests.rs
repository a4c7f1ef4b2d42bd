use proptest::prelude::*;
use std::collections::BTreeSet;
use urania::aspects::{AspectKind, AspectTable};
use urania::circuits::{
    build_patterns, detect_minor_links, generate_combo_groups, internal_minor_edges,
    ConjunctionClusters, ShapeKind,
};
use urania::{ChartAnalyzer, PositionMap};

fn chart(bodies: &[(&str, f64)]) -> PositionMap {
    bodies.iter().map(|(n, l)| (*n, *l)).collect()
}

#[test]
fn test_worked_example_forms_one_pattern() {
    let positions = chart(&[("Sun", 10.0), ("Mars", 100.0), ("Moon", 220.0)]);
    let patterns = build_patterns(&positions, &AspectTable::default());

    assert_eq!(patterns.len(), 1);
    let expected: BTreeSet<String> = ["Sun", "Mars", "Moon"].iter().map(|s| s.to_string()).collect();
    assert_eq!(patterns[0], expected);

    let analysis = ChartAnalyzer::default().analyze(&positions, None);
    assert!(analysis.minor_links.singletons.is_empty());
    assert!(analysis.shapes.iter().all(|s| s.kind != ShapeKind::TSquare));
    assert!(analysis.shapes.iter().all(|s| s.kind != ShapeKind::Wedge));
}

#[test]
fn test_minor_links_between_patterns_and_singletons() {
    // Sun-Mars trine; Pluto quincunx Sun only
    let positions = chart(&[("Sun", 0.0), ("Mars", 120.0), ("Pluto", 150.0)]);
    let table = AspectTable::default();
    let patterns = build_patterns(&positions, &table);
    let links = detect_minor_links(&positions, &patterns, &table);

    assert_eq!(patterns.len(), 1);
    assert_eq!(links.singletons.get("Pluto"), Some(&1));
    assert_eq!(links.filaments.len(), 1);
    let filament = &links.filaments[0];
    assert_eq!(filament.aspect, AspectKind::Quincunx);
    assert!(filament.crosses_patterns());

    assert_eq!(generate_combo_groups(&links.filaments), vec![vec![0, 1]]);
}

#[test]
fn test_internal_minor_edges_stay_inside_pattern() {
    let positions = chart(&[("Sun", 10.0), ("Mars", 100.0), ("Moon", 220.0)]);
    let table = AspectTable::default();
    let patterns = build_patterns(&positions, &table);
    let edges = internal_minor_edges(&positions, &patterns[0], &table);

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].aspect, AspectKind::Quincunx);
    assert_eq!(edges[0].key(), ("Moon", "Sun"));
}

fn arbitrary_chart() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..360.0, 0..14)
}

proptest! {
    #[test]
    fn prop_patterns_and_singletons_partition_bodies(lons in arbitrary_chart()) {
        let positions: PositionMap = lons
            .iter()
            .enumerate()
            .map(|(i, lon)| (format!("B{}", i), *lon))
            .collect();
        let table = AspectTable::default();
        let patterns = build_patterns(&positions, &table);
        let links = detect_minor_links(&positions, &patterns, &table);

        let mut seen = BTreeSet::new();
        for pattern in &patterns {
            prop_assert!(pattern.len() >= 2);
            for body in pattern {
                prop_assert!(seen.insert(body.clone()));
            }
        }
        for body in links.singletons.keys() {
            prop_assert!(seen.insert(body.clone()));
        }
        let all: BTreeSet<String> = positions.names().map(String::from).collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn prop_every_member_in_exactly_one_cluster(lons in arbitrary_chart(), orb in 0.0f64..10.0) {
        let positions: PositionMap = lons
            .iter()
            .enumerate()
            .map(|(i, lon)| (format!("B{}", i), *lon))
            .collect();
        let clusters = ConjunctionClusters::build(&positions, positions.names(), orb);

        let mut count = 0;
        for cluster in clusters.clusters() {
            for member in &cluster.members {
                prop_assert_eq!(clusters.rep_of(member), Some(cluster.id));
                count += 1;
            }
        }
        prop_assert_eq!(count, positions.len());
    }
}
