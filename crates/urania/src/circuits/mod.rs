pub mod cluster;
pub mod filaments;
pub mod graph;
pub mod shapes;

pub use cluster::{Cluster, ClusterId, ConjunctionClusters};
pub use filaments::{detect_minor_links, generate_combo_groups, internal_minor_edges, Filament, MinorLinks};
pub use graph::{build_patterns, AspectEdge, AspectGraph, Pattern};
pub use shapes::{
    apply_suppression, detect_shapes, detect_shapes_cached, MatchMode, MemoryShapeCache, NoCache,
    Shape, ShapeCache, ShapeDetector, ShapeEdge, ShapeKind, Suppression,
};
