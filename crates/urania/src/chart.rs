//! One-call analysis of a chart: circuits, filaments, shapes and dispositors.

use crate::circuits::filaments::{detect_minor_links, generate_combo_groups, MinorLinks};
use crate::circuits::graph::{AspectEdge, AspectGraph, Pattern};
use crate::circuits::shapes::{detect_shapes_cached, NoCache, Shape, ShapeCache};
use crate::config::Settings;
use crate::ephemeris::{CuspProvider, GeoLocation, PositionMap, PositionProvider, ProviderError};
use crate::western::dispositors::{self, DispositorAnalysis, DispositorResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything computed for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartAnalysis {
    pub patterns: Vec<Pattern>,
    pub major_edges: Vec<AspectEdge>,
    pub minor_links: MinorLinks,
    /// Pattern/singleton indices joined by minor filaments
    pub combo_groups: Vec<Vec<usize>>,
    pub shapes: Vec<Shape>,
    pub dispositors: DispositorAnalysis,
    /// By-house dispositors per named house system
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub house_systems: BTreeMap<String, DispositorResult>,
}

pub struct ChartAnalyzer {
    settings: Settings,
    cache: Box<dyn ShapeCache>,
}

impl ChartAnalyzer {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cache: Box::new(NoCache),
        }
    }

    /// Memoize shape detection through `cache`.
    pub fn with_cache(mut self, cache: impl ShapeCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn analyze(&mut self, positions: &PositionMap, cusps: Option<&[f64]>) -> ChartAnalysis {
        let table = &self.settings.aspects;
        let graph = AspectGraph::build(positions, table);
        let patterns = graph.patterns(positions);
        let minor_links = detect_minor_links(positions, &patterns, table);
        let combo_groups = generate_combo_groups(&minor_links.filaments);
        let shapes = detect_shapes_cached(
            self.cache.as_mut(),
            positions,
            &patterns,
            &graph,
            &self.settings,
        );
        let dispositors = dispositors::analyze(positions, cusps, self.settings.rulership);

        log::info!(
            "Analyzed {} bodies: {} patterns, {} shapes, {} singletons",
            positions.len(),
            patterns.len(),
            shapes.len(),
            minor_links.singletons.len()
        );

        ChartAnalysis {
            patterns,
            major_edges: graph.edges().to_vec(),
            minor_links,
            combo_groups,
            shapes,
            dispositors,
            house_systems: BTreeMap::new(),
        }
    }

    /// Analyze a chart, adding one by-house dispositor result per house system.
    pub fn analyze_with_systems(
        &mut self,
        positions: &PositionMap,
        cusps: Option<&[f64]>,
        cusps_by_system: &BTreeMap<String, Vec<f64>>,
    ) -> ChartAnalysis {
        let mut analysis = self.analyze(positions, cusps);
        analysis.house_systems =
            dispositors::analyze_across_systems(positions, cusps_by_system, self.settings.rulership);
        analysis
    }

    /// Fetch positions and cusps for a moment, then analyze.
    ///
    /// Provider failures are returned; a provider with no cusps skips the
    /// house-based dispositors.
    pub fn analyze_moment<P, C>(
        &mut self,
        positions: &P,
        cusps: &C,
        moment: DateTime<Utc>,
        location: Option<GeoLocation>,
        house_system: &str,
    ) -> Result<ChartAnalysis, ProviderError>
    where
        P: PositionProvider + ?Sized,
        C: CuspProvider + ?Sized,
    {
        let bodies = positions.positions(moment, location)?;
        let cusp_list = cusps.cusps(moment, location, house_system)?;
        Ok(self.analyze(&bodies, cusp_list.as_deref()))
    }
}

impl Default for ChartAnalyzer {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::shapes::MemoryShapeCache;
    use crate::ephemeris::StaticPositions;

    #[test]
    fn test_empty_chart_yields_empty_results() {
        let analysis = ChartAnalyzer::default().analyze(&PositionMap::new(), None);
        assert!(analysis.patterns.is_empty());
        assert!(analysis.shapes.is_empty());
        assert!(analysis.minor_links.singletons.is_empty());
        assert!(analysis.dispositors.by_sign.is_empty());
    }

    #[test]
    fn test_single_body_is_a_singleton() {
        let positions: PositionMap = [("Sun", 130.0)].into_iter().collect();
        let analysis = ChartAnalyzer::default().analyze(&positions, None);
        assert!(analysis.patterns.is_empty());
        assert_eq!(analysis.minor_links.singletons.get("Sun"), Some(&0));
        assert_eq!(analysis.dispositors.by_sign.self_ruling, vec!["Sun"]);
    }

    #[test]
    fn test_analyze_moment_uses_providers() {
        let provider = StaticPositions {
            positions: [("Sun", 0.0), ("Moon", 180.0), ("Mars", 90.0)]
                .into_iter()
                .collect(),
            cusps: BTreeMap::from([(
                "equal".to_string(),
                (0..12).map(|i| i as f64 * 30.0).collect(),
            )]),
        };
        let location = Some(GeoLocation { lat: 51.5, lon: 0.0 });
        let mut analyzer = ChartAnalyzer::default().with_cache(MemoryShapeCache::new());
        let analysis = analyzer
            .analyze_moment(&provider, &provider, Utc::now(), location, "equal")
            .unwrap();
        assert_eq!(analysis.patterns.len(), 1);
        assert!(!analysis.dispositors.by_house.is_empty());

        let no_houses = analyzer
            .analyze_moment(&provider, &provider, Utc::now(), None, "equal")
            .unwrap();
        assert!(no_houses.dispositors.by_house.is_empty());
        assert_eq!(no_houses.shapes, analysis.shapes);
    }
}
