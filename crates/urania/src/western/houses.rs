//! House placement from a 12-cusp array.

use crate::aspects::in_forward_arc;
use crate::western::rulers::sign_index;

pub const HOUSE_COUNT: usize = 12;

/// Exactly 12 finite cusps.
pub fn valid_cusps(cusps: &[f64]) -> bool {
    cusps.len() == HOUSE_COUNT && cusps.iter().all(|c| c.is_finite())
}

/// House number (1-12) containing `degree`, or `None` for an invalid cusp array.
///
/// House `n` spans the forward arc from cusp `n` to cusp `n + 1`.
pub fn house_of_degree(degree: f64, cusps: &[f64]) -> Option<usize> {
    if !valid_cusps(cusps) {
        return None;
    }
    let house = (0..HOUSE_COUNT)
        .find(|&i| in_forward_arc(cusps[i], cusps[(i + 1) % HOUSE_COUNT], degree))
        .map(|i| i + 1)
        // Degenerate arrays (repeated cusps) can leave gaps
        .unwrap_or(HOUSE_COUNT);
    Some(house)
}

/// Sign index of each house cusp.
pub fn cusp_signs(cusps: &[f64]) -> Option<Vec<usize>> {
    valid_cusps(cusps).then(|| cusps.iter().map(|c| sign_index(*c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_houses(asc: f64) -> Vec<f64> {
        (0..12).map(|i| (asc + 30.0 * i as f64) % 360.0).collect()
    }

    #[test]
    fn test_house_of_degree_wraps_past_aries() {
        let cusps = equal_houses(345.0);
        assert_eq!(house_of_degree(350.0, &cusps), Some(1));
        assert_eq!(house_of_degree(5.0, &cusps), Some(1));
        assert_eq!(house_of_degree(15.0, &cusps), Some(2));
        assert_eq!(house_of_degree(344.0, &cusps), Some(12));
    }

    #[test]
    fn test_invalid_cusps_are_rejected() {
        assert_eq!(house_of_degree(10.0, &[0.0; 11]), None);
        let mut cusps = equal_houses(0.0);
        cusps[3] = f64::NAN;
        assert!(cusp_signs(&cusps).is_none());
        assert_eq!(cusp_signs(&equal_houses(0.0)).map(|s| s[4]), Some(4));
    }
}
