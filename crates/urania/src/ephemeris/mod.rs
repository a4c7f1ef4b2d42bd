pub mod types;

pub use types::{
    CuspProvider, GeoLocation, PositionMap, PositionProvider, ProviderError, StaticPositions,
};
