//! Sign rulers for Western astrology.
//!
//! Maps zodiac signs to their planetary rulers under traditional, modern or
//! dual rulership. Ruler names are lowercase.

use serde::{Deserialize, Serialize};

pub const SIGN_NAMES: [&str; 12] = [
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

/// Which ruler table dispositor analysis reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulershipScheme {
    Traditional,
    Modern,
    /// Traditional and modern rulers together (two rulers for some signs)
    #[default]
    Dual,
}

const TRADITIONAL_RULERS: [&[&str]; 12] = [
    &["mars"],    // Aries
    &["venus"],   // Taurus
    &["mercury"], // Gemini
    &["moon"],    // Cancer
    &["sun"],     // Leo
    &["mercury"], // Virgo
    &["venus"],   // Libra
    &["mars"],    // Scorpio
    &["jupiter"], // Sagittarius
    &["saturn"],  // Capricorn
    &["saturn"],  // Aquarius
    &["jupiter"], // Pisces
];

const MODERN_RULERS: [&[&str]; 12] = [
    &["mars"],
    &["venus"],
    &["mercury"],
    &["moon"],
    &["sun"],
    &["mercury"],
    &["venus"],
    &["pluto"], // Scorpio
    &["jupiter"],
    &["saturn"],
    &["uranus"],  // Aquarius
    &["neptune"], // Pisces
];

const DUAL_RULERS: [&[&str]; 12] = [
    &["mars"],
    &["venus"],
    &["mercury"],
    &["moon"],
    &["sun"],
    &["mercury", "ceres"], // Virgo
    &["venus"],
    &["pluto", "mars"], // Scorpio
    &["jupiter"],
    &["saturn"],
    &["uranus", "saturn"],   // Aquarius
    &["neptune", "jupiter"], // Pisces
];

/// Get sign index (0-11) from longitude
pub fn sign_index(longitude: f64) -> usize {
    let normalized = longitude.rem_euclid(360.0);
    ((normalized / 30.0) as usize).min(11)
}

pub fn sign_name(index: usize) -> &'static str {
    SIGN_NAMES[index % 12]
}

/// Rulers of a sign (one or two) under the given scheme.
pub fn sign_rulers(sign_index: usize, scheme: RulershipScheme) -> &'static [&'static str] {
    let idx = sign_index % 12;
    match scheme {
        RulershipScheme::Traditional => TRADITIONAL_RULERS[idx],
        RulershipScheme::Modern => MODERN_RULERS[idx],
        RulershipScheme::Dual => DUAL_RULERS[idx],
    }
}

/// Rulers of the sign a longitude falls in.
pub fn sign_rulers_from_longitude(longitude: f64, scheme: RulershipScheme) -> &'static [&'static str] {
    sign_rulers(sign_index(longitude), scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rulers_traditional() {
        assert_eq!(sign_rulers(0, RulershipScheme::Traditional), ["mars"]); // Aries
        assert_eq!(sign_rulers(3, RulershipScheme::Traditional), ["moon"]); // Cancer
        assert_eq!(sign_rulers(4, RulershipScheme::Traditional), ["sun"]); // Leo
        assert_eq!(sign_rulers(7, RulershipScheme::Traditional), ["mars"]); // Scorpio
    }

    #[test]
    fn test_sign_rulers_modern() {
        assert_eq!(sign_rulers(7, RulershipScheme::Modern), ["pluto"]);
        assert_eq!(sign_rulers(10, RulershipScheme::Modern), ["uranus"]);
        assert_eq!(sign_rulers(11, RulershipScheme::Modern), ["neptune"]);
    }

    #[test]
    fn test_dual_rulers_and_longitude_lookup() {
        assert_eq!(sign_rulers(7, RulershipScheme::Dual), ["pluto", "mars"]);
        assert_eq!(
            sign_rulers_from_longitude(305.0, RulershipScheme::Dual),
            ["uranus", "saturn"]
        );
        assert_eq!(sign_index(359.99), 11);
        assert_eq!(sign_index(-30.0), 11);
        assert_eq!(sign_name(4), "Leo");
    }
}
