use crate::aspects::AspectKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Sorted body names of a shape, used for dedup and suppression keys.
pub type MemberSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    #[serde(rename = "T-Square")]
    TSquare,
    Yod,
    #[serde(rename = "Grand Trine")]
    GrandTrine,
    Wedge,
    #[serde(rename = "Sextile Wedge")]
    SextileWedge,
    Kite,
    #[serde(rename = "Mystic Rectangle")]
    MysticRectangle,
    Cradle,
    Envelope,
    #[serde(rename = "Grand Cross")]
    GrandCross,
    #[serde(rename = "Wide Yod")]
    WideYod,
    Unnamed,
    #[serde(rename = "Lightning Bolt")]
    LightningBolt,
    Remainder,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::TSquare => "T-Square",
            ShapeKind::Yod => "Yod",
            ShapeKind::GrandTrine => "Grand Trine",
            ShapeKind::Wedge => "Wedge",
            ShapeKind::SextileWedge => "Sextile Wedge",
            ShapeKind::Kite => "Kite",
            ShapeKind::MysticRectangle => "Mystic Rectangle",
            ShapeKind::Cradle => "Cradle",
            ShapeKind::Envelope => "Envelope",
            ShapeKind::GrandCross => "Grand Cross",
            ShapeKind::WideYod => "Wide Yod",
            ShapeKind::Unnamed => "Unnamed",
            ShapeKind::LightningBolt => "Lightning Bolt",
            ShapeKind::Remainder => "Remainder",
        }
    }

    /// A shape may only suppress shapes of equal or lower priority.
    pub fn priority(self) -> u8 {
        match self {
            ShapeKind::LightningBolt => 3,
            ShapeKind::Envelope
            | ShapeKind::GrandCross
            | ShapeKind::MysticRectangle
            | ShapeKind::Cradle
            | ShapeKind::Kite => 2,
            ShapeKind::GrandTrine
            | ShapeKind::TSquare
            | ShapeKind::Wedge
            | ShapeKind::SextileWedge
            | ShapeKind::Yod
            | ShapeKind::WideYod => 1,
            ShapeKind::Unnamed | ShapeKind::Remainder => 0,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One aspect line instantiating a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeEdge {
    pub a: String,
    pub b: String,
    pub aspect: AspectKind,
    /// Only matched within the widened near-tier orb
    #[serde(default)]
    pub approx: bool,
}

/// Sub-shapes a larger shape makes redundant, and sub-shapes it protects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    #[serde(default)]
    pub suppress: BTreeMap<ShapeKind, BTreeSet<MemberSet>>,
    #[serde(default)]
    pub keep: BTreeMap<ShapeKind, BTreeSet<MemberSet>>,
}

impl Suppression {
    pub fn is_empty(&self) -> bool {
        self.suppress.is_empty() && self.keep.is_empty()
    }

    pub fn keeps(&self, kind: ShapeKind, members: &MemberSet) -> bool {
        self.keep
            .get(&kind)
            .is_some_and(|sets| sets.contains(members))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Index of the pattern this shape belongs to
    pub parent: usize,
    pub members: Vec<String>,
    pub edges: Vec<ShapeEdge>,
    #[serde(default)]
    pub approx: bool,
    #[serde(default)]
    pub remainder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppresses: Option<Suppression>,
}

impl Shape {
    pub fn member_set(&self) -> MemberSet {
        self.members.iter().cloned().collect()
    }

    /// Dedup key: kind plus sorted member set.
    pub fn key(&self) -> (ShapeKind, MemberSet) {
        (self.kind, self.member_set())
    }
}
