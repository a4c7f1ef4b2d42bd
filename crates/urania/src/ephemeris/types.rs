use crate::aspects::normalize_degrees;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Errors reported by external position or cusp providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to calculate positions at {datetime}: {message}")]
    CalculationFailed {
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("Unsupported house system: {0}")]
    UnsupportedHouseSystem(String),
}

/// Body name -> ecliptic longitude in [0, 360).
///
/// Keys are unique and iterate in name order, so every computation over a map
/// is deterministic. Non-finite longitudes are rejected on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PositionMap {
    bodies: BTreeMap<String, f64>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body; returns false (and stores nothing) for NaN/infinite longitudes.
    pub fn insert(&mut self, name: impl Into<String>, lon: f64) -> bool {
        let name = name.into();
        if !lon.is_finite() {
            log::warn!("Dropping {} with non-finite longitude {}", name, lon);
            return false;
        }
        self.bodies.insert(name, normalize_degrees(lon));
        true
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.bodies.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bodies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.bodies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.bodies.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names ordered by ascending longitude, ties broken by name.
    pub fn names_by_longitude(&self) -> Vec<&str> {
        let mut names: Vec<(&str, f64)> = self.iter().collect();
        names.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        names.into_iter().map(|(name, _)| name).collect()
    }

    /// Canonical text form used for cache keys.
    pub fn signature(&self) -> String {
        self.iter()
            .map(|(name, lon)| format!("{}={:.6}", name, lon))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl From<BTreeMap<String, f64>> for PositionMap {
    fn from(map: BTreeMap<String, f64>) -> Self {
        map.into_iter().collect()
    }
}

impl From<PositionMap> for BTreeMap<String, f64> {
    fn from(map: PositionMap) -> Self {
        map.bodies
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for PositionMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut map = PositionMap::new();
        for (name, lon) in iter {
            map.insert(name, lon);
        }
        map
    }
}

/// Supplies body longitudes for a moment and optional location.
pub trait PositionProvider {
    fn positions(
        &self,
        moment: DateTime<Utc>,
        location: Option<GeoLocation>,
    ) -> Result<PositionMap, ProviderError>;
}

/// Supplies the 12 house cusps (houses 1..12) for a house system.
///
/// `Ok(None)` means house-based analysis should be skipped.
pub trait CuspProvider {
    fn cusps(
        &self,
        moment: DateTime<Utc>,
        location: Option<GeoLocation>,
        system: &str,
    ) -> Result<Option<Vec<f64>>, ProviderError>;
}

/// Fixed positions and cusps, independent of the requested moment.
#[derive(Debug, Clone, Default)]
pub struct StaticPositions {
    pub positions: PositionMap,
    pub cusps: BTreeMap<String, Vec<f64>>,
}

impl PositionProvider for StaticPositions {
    fn positions(
        &self,
        _moment: DateTime<Utc>,
        _location: Option<GeoLocation>,
    ) -> Result<PositionMap, ProviderError> {
        Ok(self.positions.clone())
    }
}

impl CuspProvider for StaticPositions {
    fn cusps(
        &self,
        _moment: DateTime<Utc>,
        location: Option<GeoLocation>,
        system: &str,
    ) -> Result<Option<Vec<f64>>, ProviderError> {
        if location.is_none() {
            return Ok(None);
        }
        Ok(self.cusps.get(system).cloned())
    }
}
