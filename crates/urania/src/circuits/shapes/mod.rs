pub mod cache;
pub mod detector;
mod remainder;
mod special;
pub mod suppression;
pub mod types;

pub use cache::{detect_shapes_cached, shape_signature, MemoryShapeCache, NoCache, ShapeCache};
pub use detector::{detect_shapes, MatchMode, ShapeDetector};
pub use suppression::{apply_suppression, order_shapes};
pub use types::{MemberSet, Shape, ShapeEdge, ShapeKind, Suppression};
