pub mod calculator;
pub mod types;

pub use calculator::{
    angular_separation, circular_mean, in_forward_arc, normalize_degrees, AspectCalculator,
    DEFAULT_NEAR_FACTOR,
};
pub use types::{AspectDef, AspectHit, AspectKind, AspectStatus, AspectTable};
