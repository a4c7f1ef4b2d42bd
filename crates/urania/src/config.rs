//! Detection settings: aspect orbs, conjunction clustering and rulership scheme.
//!
//! Settings are read from TOML into a loose mirror struct, then validated into
//! [`Settings`]. Malformed aspect entries fail here, never during detection.

use crate::aspects::{AspectDef, AspectKind, AspectTable, DEFAULT_NEAR_FACTOR};
use crate::western::RulershipScheme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default orb (degrees) for chaining bodies into one conjunction cluster.
pub const DEFAULT_CLUSTER_ORB: f64 = 4.0;

/// Errors raised while loading or querying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings TOML: {0}")]
    Parse(String),
    #[error("Aspect {aspect} is missing required field `{field}`")]
    MissingField { aspect: String, field: &'static str },
    #[error("Unknown aspect: {0}")]
    UnknownAspect(String),
    #[error("Invalid field value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub aspects: AspectTable,
    /// Maximum gap between neighbouring members of one conjunction cluster
    pub cluster_orb: f64,
    pub rulership: RulershipScheme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aspects: AspectTable::default(),
            cluster_orb: DEFAULT_CLUSTER_ORB,
            rulership: RulershipScheme::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AspectToml {
    #[serde(default)]
    angle: Option<f64>,
    #[serde(default)]
    orb: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct SettingsToml {
    #[serde(default = "default_cluster_orb")]
    cluster_orb: f64,
    #[serde(default = "default_near_factor")]
    near_factor: f64,
    #[serde(default)]
    rulership: RulershipScheme,
    #[serde(default)]
    aspects: BTreeMap<String, AspectToml>,
}

fn default_cluster_orb() -> f64 {
    DEFAULT_CLUSTER_ORB
}

fn default_near_factor() -> f64 {
    DEFAULT_NEAR_FACTOR
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: SettingsToml =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let SettingsToml {
            cluster_orb,
            near_factor,
            rulership,
            aspects,
        } = raw;

        if !cluster_orb.is_finite() || cluster_orb < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "cluster_orb must be a non-negative number, got {}",
                cluster_orb
            )));
        }
        if !near_factor.is_finite() || near_factor < 1.0 {
            return Err(ConfigError::InvalidValue(format!(
                "near_factor must be >= 1.0, got {}",
                near_factor
            )));
        }

        let defaults = AspectTable::default();
        let mut defs = BTreeMap::new();
        for (name, entry) in aspects {
            let kind = AspectKind::from_name(&name)
                .ok_or_else(|| ConfigError::UnknownAspect(name.clone()))?;
            let base = defaults.get(kind);
            let angle = entry.angle.unwrap_or(base.angle);
            let orb = entry.orb.ok_or_else(|| ConfigError::MissingField {
                aspect: name.clone(),
                field: "orb",
            })?;
            if !angle.is_finite() || !(0.0..=180.0).contains(&angle) {
                return Err(ConfigError::InvalidValue(format!(
                    "aspect {} angle must lie in [0, 180], got {}",
                    name, angle
                )));
            }
            if !orb.is_finite() || orb < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "aspect {} orb must be non-negative, got {}",
                    name, orb
                )));
            }
            defs.insert(kind, AspectDef { angle, orb });
        }

        log::debug!(
            "Loaded settings: {} aspect override(s), cluster_orb={}, near_factor={}, rulership={:?}",
            defs.len(),
            cluster_orb,
            near_factor,
            rulership
        );

        Ok(Self {
            aspects: AspectTable::new(defs, near_factor),
            cluster_orb,
            rulership,
        })
    }

    /// Read settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.cluster_orb, DEFAULT_CLUSTER_ORB);
        assert_eq!(settings.aspects, AspectTable::default());
        assert_eq!(settings.rulership, RulershipScheme::Dual);
    }

    #[test]
    fn test_override_merges_onto_defaults() {
        let text = r#"
cluster_orb = 3.0
rulership = "traditional"

[aspects.Square]
orb = 5.0
"#;
        let settings = Settings::from_toml_str(text).unwrap();
        assert_eq!(settings.cluster_orb, 3.0);
        assert_eq!(settings.rulership, RulershipScheme::Traditional);
        let square = settings.aspects.get(AspectKind::Square);
        assert_eq!(square.angle, 90.0);
        assert_eq!(square.orb, 5.0);
        assert_eq!(settings.aspects.get(AspectKind::Trine).orb, 3.0);
    }

    #[test]
    fn test_missing_orb_fails_at_load() {
        let text = "[aspects.Trine]\nangle = 120.0\n";
        let err = Settings::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "orb", .. }));
    }

    #[test]
    fn test_unknown_aspect_fails_at_load() {
        let text = "[aspects.Hexagram]\nangle = 40.0\norb = 1.0\n";
        assert!(matches!(
            Settings::from_toml_str(text),
            Err(ConfigError::UnknownAspect(_))
        ));
    }

    #[test]
    fn test_near_factor_below_one_rejected() {
        assert!(matches!(
            Settings::from_toml_str("near_factor = 0.5"),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
