use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const SEPTILE: f64 = 51.0 + 26.0 / 60.0;
const BISEPTILE: f64 = 102.0 + 52.0 / 60.0;
const TRISEPTILE: f64 = 154.0 + 17.0 / 60.0;

/// Named angular relationship between two longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Conjunction,
    #[serde(rename = "Semi-sextile")]
    SemiSextile,
    #[serde(rename = "Semi-square")]
    SemiSquare,
    Septile,
    Sextile,
    Quintile,
    Square,
    Biseptile,
    Trine,
    Sesquisquare,
    Biquintile,
    Quincunx,
    Triseptile,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 14] = [
        AspectKind::Conjunction,
        AspectKind::SemiSextile,
        AspectKind::SemiSquare,
        AspectKind::Septile,
        AspectKind::Sextile,
        AspectKind::Quintile,
        AspectKind::Square,
        AspectKind::Biseptile,
        AspectKind::Trine,
        AspectKind::Sesquisquare,
        AspectKind::Biquintile,
        AspectKind::Quincunx,
        AspectKind::Triseptile,
        AspectKind::Opposition,
    ];

    /// Major aspects in first-match priority order (most common first).
    pub const MAJOR: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Trine,
        AspectKind::Square,
        AspectKind::Sextile,
    ];

    /// Aspects that form filaments between circuits.
    pub const MINOR_LINKS: [AspectKind; 2] = [AspectKind::Quincunx, AspectKind::Sesquisquare];

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Conjunction",
            AspectKind::SemiSextile => "Semi-sextile",
            AspectKind::SemiSquare => "Semi-square",
            AspectKind::Septile => "Septile",
            AspectKind::Sextile => "Sextile",
            AspectKind::Quintile => "Quintile",
            AspectKind::Square => "Square",
            AspectKind::Biseptile => "Biseptile",
            AspectKind::Trine => "Trine",
            AspectKind::Sesquisquare => "Sesquisquare",
            AspectKind::Biquintile => "Biquintile",
            AspectKind::Quincunx => "Quincunx",
            AspectKind::Triseptile => "Triseptile",
            AspectKind::Opposition => "Opposition",
        }
    }

    /// Case-insensitive lookup; accepts "semi-sextile", "SemiSextile" and "semi_sextile".
    pub fn from_name(name: &str) -> Option<AspectKind> {
        let wanted: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        AspectKind::ALL.iter().copied().find(|kind| {
            let candidate: String = kind
                .name()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            candidate == wanted
        })
    }

    pub fn is_major(self) -> bool {
        AspectKind::MAJOR.contains(&self)
    }

    pub fn default_angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::SemiSextile => 30.0,
            AspectKind::SemiSquare => 45.0,
            AspectKind::Septile => SEPTILE,
            AspectKind::Sextile => 60.0,
            AspectKind::Quintile => 72.0,
            AspectKind::Square => 90.0,
            AspectKind::Biseptile => BISEPTILE,
            AspectKind::Trine => 120.0,
            AspectKind::Sesquisquare => 135.0,
            AspectKind::Biquintile => 144.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::Triseptile => TRISEPTILE,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn default_orb(self) -> f64 {
        match self {
            AspectKind::Conjunction => 5.0,
            AspectKind::Sextile
            | AspectKind::Square
            | AspectKind::Trine
            | AspectKind::Quincunx
            | AspectKind::Opposition => 3.0,
            _ => 2.0,
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target angle and orb tolerance for one aspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectDef {
    /// Exact angle in degrees
    pub angle: f64,
    /// Allowed deviation from the exact angle
    pub orb: f64,
}

/// Outcome of testing a separation against one aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectStatus {
    Present,
    Near,
    Absent,
}

impl AspectStatus {
    pub fn is_present(self) -> bool {
        self == AspectStatus::Present
    }

    /// Present or near.
    pub fn is_near(self) -> bool {
        self != AspectStatus::Absent
    }
}

/// The aspect lookup table plus the near-tier widening factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectTable {
    pub(crate) defs: BTreeMap<AspectKind, AspectDef>,
    pub(crate) near_factor: f64,
}

/// A single aspect hit between two longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectHit {
    pub aspect: AspectKind,
    /// Exact angle for this aspect
    pub exact_angle: f64,
    /// Deviation from the exact angle
    pub orb: f64,
}
