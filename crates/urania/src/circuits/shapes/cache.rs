//! Memoization of shape detection keyed by a canonical chart signature.

use crate::circuits::graph::{AspectGraph, Pattern};
use crate::circuits::shapes::detector::detect_shapes;
use crate::circuits::shapes::types::Shape;
use crate::config::Settings;
use crate::ephemeris::PositionMap;
use std::collections::HashMap;

/// Storage for previously detected shape lists.
pub trait ShapeCache {
    fn get(&self, key: &str) -> Option<Vec<Shape>>;
    fn put(&mut self, key: String, shapes: Vec<Shape>);
}

/// Never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ShapeCache for NoCache {
    fn get(&self, _key: &str) -> Option<Vec<Shape>> {
        None
    }

    fn put(&mut self, _key: String, _shapes: Vec<Shape>) {}
}

/// In-memory cache owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryShapeCache {
    entries: HashMap<String, Vec<Shape>>,
}

impl MemoryShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ShapeCache for MemoryShapeCache {
    fn get(&self, key: &str) -> Option<Vec<Shape>> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: String, shapes: Vec<Shape>) {
        self.entries.insert(key, shapes);
    }
}

/// Canonical key over everything shape detection depends on.
pub fn shape_signature(
    positions: &PositionMap,
    patterns: &[Pattern],
    graph: &AspectGraph,
    settings: &Settings,
) -> String {
    let patterns = patterns
        .iter()
        .map(|p| p.iter().cloned().collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("|");
    let settings = serde_json::to_string(settings).unwrap_or_default();
    format!(
        "{}#{}#{}#{}",
        positions.signature(),
        patterns,
        graph.signature(),
        settings
    )
}

/// [`detect_shapes`] through a cache.
pub fn detect_shapes_cached(
    cache: &mut dyn ShapeCache,
    positions: &PositionMap,
    patterns: &[Pattern],
    graph: &AspectGraph,
    settings: &Settings,
) -> Vec<Shape> {
    let key = shape_signature(positions, patterns, graph, settings);
    if let Some(shapes) = cache.get(&key) {
        log::debug!("Shape cache hit");
        return shapes;
    }
    let shapes = detect_shapes(positions, patterns, graph, settings);
    cache.put(key, shapes.clone());
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_result_matches_fresh_detection() {
        let positions: PositionMap = [("Sun", 0.0), ("Moon", 180.0), ("Mars", 90.0)]
            .into_iter()
            .collect();
        let settings = Settings::default();
        let graph = AspectGraph::build(&positions, &settings.aspects);
        let patterns = graph.patterns(&positions);

        let mut cache = MemoryShapeCache::new();
        let first = detect_shapes_cached(&mut cache, &positions, &patterns, &graph, &settings);
        assert_eq!(cache.len(), 1);
        let second = detect_shapes_cached(&mut cache, &positions, &patterns, &graph, &settings);
        let uncached = detect_shapes_cached(&mut NoCache, &positions, &patterns, &graph, &settings);
        assert_eq!(first, second);
        assert_eq!(first, uncached);
    }

    #[test]
    fn test_signature_changes_with_settings() {
        let positions: PositionMap = [("Sun", 0.0), ("Mars", 90.0)].into_iter().collect();
        let settings = Settings::default();
        let graph = AspectGraph::build(&positions, &settings.aspects);
        let patterns = graph.patterns(&positions);
        let wider = Settings {
            cluster_orb: 6.0,
            ..Settings::default()
        };
        assert_ne!(
            shape_signature(&positions, &patterns, &graph, &settings),
            shape_signature(&positions, &patterns, &graph, &wider)
        );
    }
}
