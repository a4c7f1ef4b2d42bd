use crate::aspects::types::{AspectDef, AspectHit, AspectKind, AspectStatus, AspectTable};
use crate::config::ConfigError;
use std::collections::BTreeMap;

/// Default near-tier widening: a separation within `orb * 1.5` counts as near.
pub const DEFAULT_NEAR_FACTOR: f64 = 1.5;

lazy_static::lazy_static! {
    static ref DEFAULT_TABLE: AspectTable = {
        let defs = AspectKind::ALL
            .iter()
            .map(|kind| {
                (
                    *kind,
                    AspectDef {
                        angle: kind.default_angle(),
                        orb: kind.default_orb(),
                    },
                )
            })
            .collect();
        AspectTable {
            defs,
            near_factor: DEFAULT_NEAR_FACTOR,
        }
    };
}

/// Normalize degrees to [0, 360).
pub fn normalize_degrees(value: f64) -> f64 {
    let normalized = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Smallest unsigned arc between two longitudes, in [0, 180].
pub fn angular_separation(lon1: f64, lon2: f64) -> f64 {
    let diff = (normalize_degrees(lon1) - normalize_degrees(lon2)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// True if `x` lies on the forward arc from `start` to `end` (mod 360).
pub fn in_forward_arc(start: f64, end: f64, x: f64) -> bool {
    let span = normalize_degrees(end - start);
    let offset = normalize_degrees(x - start);
    if span == 0.0 {
        offset == 0.0
    } else {
        offset < span
    }
}

/// Circular mean of a set of longitudes, via sine/cosine averaging.
pub fn circular_mean(longitudes: &[f64]) -> Option<f64> {
    if longitudes.is_empty() {
        return None;
    }
    let (sin_sum, cos_sum) = longitudes.iter().fold((0.0, 0.0), |(s, c), lon| {
        let rad = lon.to_radians();
        (s + rad.sin(), c + rad.cos())
    });
    let n = longitudes.len() as f64;
    let (sin_mean, cos_mean) = (sin_sum / n, cos_sum / n);
    if sin_mean.abs() < 1e-12 && cos_mean.abs() < 1e-12 {
        // Evenly spread points have no mean direction
        return Some(normalize_degrees(longitudes[0]));
    }
    Some(normalize_degrees(sin_mean.atan2(cos_mean).to_degrees()))
}

impl AspectTable {
    /// Build a table from explicit definitions. Kinds not listed fall back to their defaults.
    pub fn new(defs: BTreeMap<AspectKind, AspectDef>, near_factor: f64) -> Self {
        let mut table = DEFAULT_TABLE.clone();
        table.defs.extend(defs);
        table.near_factor = near_factor;
        table
    }

    pub fn get(&self, kind: AspectKind) -> AspectDef {
        self.defs.get(&kind).copied().unwrap_or(AspectDef {
            angle: kind.default_angle(),
            orb: kind.default_orb(),
        })
    }

    /// Look up an aspect by name. Unknown names are a configuration error.
    pub fn lookup(&self, name: &str) -> Result<AspectDef, ConfigError> {
        AspectKind::from_name(name)
            .map(|kind| self.get(kind))
            .ok_or_else(|| ConfigError::UnknownAspect(name.to_string()))
    }

    pub fn near_factor(&self) -> f64 {
        self.near_factor
    }

    pub fn defs(&self) -> impl Iterator<Item = (AspectKind, AspectDef)> + '_ {
        self.defs.iter().map(|(k, d)| (*k, *d))
    }

    /// Classify a separation (degrees, 0..=180) against one aspect.
    pub fn match_aspect(&self, separation: f64, kind: AspectKind) -> AspectStatus {
        let def = self.get(kind);
        let delta = (separation - def.angle).abs();
        if delta <= def.orb {
            AspectStatus::Present
        } else if delta <= def.orb * self.near_factor {
            AspectStatus::Near
        } else {
            AspectStatus::Absent
        }
    }

    /// Classify the aspect between two longitudes.
    pub fn status_between(&self, lon1: f64, lon2: f64, kind: AspectKind) -> AspectStatus {
        self.match_aspect(angular_separation(lon1, lon2), kind)
    }
}

impl Default for AspectTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

/// Aspect calculator
pub struct AspectCalculator;

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new() -> Self {
        Self
    }

    /// First aspect of `kinds` (in the given priority order) present between two longitudes.
    pub fn calculate_aspect(
        &self,
        lon1: f64,
        lon2: f64,
        table: &AspectTable,
        kinds: &[AspectKind],
    ) -> Option<AspectHit> {
        let angle_diff = angular_separation(lon1, lon2);

        for kind in kinds {
            let def = table.get(*kind);
            let orb_value = (angle_diff - def.angle).abs();
            if orb_value <= def.orb {
                return Some(AspectHit {
                    aspect: *kind,
                    exact_angle: def.angle,
                    orb: orb_value,
                });
            }
        }

        None
    }

    /// First major aspect between two longitudes.
    pub fn major_aspect(&self, lon1: f64, lon2: f64, table: &AspectTable) -> Option<AspectHit> {
        self.calculate_aspect(lon1, lon2, table, &AspectKind::MAJOR)
    }
}

impl Default for AspectCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_wraps_around_zero() {
        assert_eq!(angular_separation(350.0, 10.0), 20.0);
        assert_eq!(angular_separation(10.0, 350.0), 20.0);
        assert_eq!(angular_separation(0.0, 180.0), 180.0);
        assert_eq!(angular_separation(42.0, 42.0), 0.0);
        assert_eq!(angular_separation(-30.0, 30.0), 60.0);
    }

    #[test]
    fn test_near_tier_sits_between_present_and_absent() {
        let table = AspectTable::default();
        // Square orb 3, near up to 4.5
        assert_eq!(table.match_aspect(92.0, AspectKind::Square), AspectStatus::Present);
        assert_eq!(table.match_aspect(94.0, AspectKind::Square), AspectStatus::Near);
        assert_eq!(table.match_aspect(95.0, AspectKind::Square), AspectStatus::Absent);
    }

    #[test]
    fn test_lookup_unknown_name_is_config_error() {
        let table = AspectTable::default();
        assert!(table.lookup("semi-sextile").is_ok());
        assert!(matches!(
            table.lookup("Hexagram"),
            Err(ConfigError::UnknownAspect(name)) if name == "Hexagram"
        ));
    }

    #[test]
    fn test_forward_arc() {
        assert!(in_forward_arc(350.0, 20.0, 5.0));
        assert!(!in_forward_arc(350.0, 20.0, 25.0));
        assert!(in_forward_arc(0.0, 30.0, 0.0));
        assert!(!in_forward_arc(0.0, 30.0, 30.0));
    }

    #[test]
    fn test_circular_mean_handles_wraparound() {
        let mean = circular_mean(&[358.0, 2.0]).unwrap();
        assert!(mean < 1e-9 || (360.0 - mean) < 1e-9);
        let mean = circular_mean(&[10.0, 20.0]).unwrap();
        assert!((mean - 15.0).abs() < 1e-9);
    }
}
