pub mod aspects;
pub mod chart;
pub mod circuits;
pub mod config;
pub mod ephemeris;
pub mod western;

pub use aspects::{angular_separation, AspectCalculator, AspectKind, AspectStatus, AspectTable};
pub use chart::{ChartAnalysis, ChartAnalyzer};
pub use circuits::{
    build_patterns, detect_minor_links, detect_shapes, generate_combo_groups, AspectGraph,
    ConjunctionClusters, MemoryShapeCache, NoCache, Pattern, Shape, ShapeCache, ShapeKind,
};
pub use config::{ConfigError, Settings};
pub use ephemeris::{
    CuspProvider, GeoLocation, PositionMap, PositionProvider, ProviderError, StaticPositions,
};
pub use western::{DispositorAnalysis, DispositorResult, RulershipScheme};
