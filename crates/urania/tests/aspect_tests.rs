use proptest::prelude::*;
use urania::aspects::{angular_separation, AspectCalculator, AspectKind, AspectStatus, AspectTable};

#[test]
fn test_calculate_aspect_conjunction() {
    let calculator = AspectCalculator::new();
    let table = AspectTable::default();

    // Two bodies 2 degrees apart (within the 5 degree conjunction orb)
    let aspect = calculator.major_aspect(100.0, 102.0, &table);

    assert!(aspect.is_some());
    let aspect = aspect.unwrap();
    assert_eq!(aspect.aspect, AspectKind::Conjunction);
    assert!((aspect.orb - 2.0).abs() < 1e-9);
}

#[test]
fn test_calculate_aspect_opposition_across_zero() {
    let calculator = AspectCalculator::new();
    let table = AspectTable::default();

    // 350 and 172 are 178 degrees apart
    let aspect = calculator.major_aspect(350.0, 172.0, &table);

    assert!(aspect.is_some());
    assert_eq!(aspect.unwrap().aspect, AspectKind::Opposition);
}

#[test]
fn test_worked_example_separations() {
    let table = AspectTable::default();

    // Sun 10 (Aries), Mars 100 (Cancer), Moon 220 (Scorpio)
    assert_eq!(angular_separation(10.0, 100.0), 90.0);
    assert_eq!(angular_separation(100.0, 220.0), 120.0);
    assert_eq!(angular_separation(10.0, 220.0), 150.0);

    assert_eq!(
        table.status_between(10.0, 100.0, AspectKind::Square),
        AspectStatus::Present
    );
    assert_eq!(
        table.status_between(100.0, 220.0, AspectKind::Trine),
        AspectStatus::Present
    );
    assert_eq!(
        table.status_between(10.0, 220.0, AspectKind::Quincunx),
        AspectStatus::Present
    );
}

#[test]
fn test_near_tier_is_orb_times_factor() {
    let table = AspectTable::default();

    // Square orb 3, near tier 4.5
    assert_eq!(table.match_aspect(93.0, AspectKind::Square), AspectStatus::Present);
    assert_eq!(table.match_aspect(94.5, AspectKind::Square), AspectStatus::Near);
    assert_eq!(table.match_aspect(94.6, AspectKind::Square), AspectStatus::Absent);
}

#[test]
fn test_minor_aspects_are_not_major_matches() {
    let calculator = AspectCalculator::new();
    let table = AspectTable::default();

    assert!(calculator.major_aspect(0.0, 150.0, &table).is_none());
    let hit = calculator.calculate_aspect(0.0, 150.0, &table, &AspectKind::MINOR_LINKS);
    assert_eq!(hit.map(|h| h.aspect), Some(AspectKind::Quincunx));
}

#[test]
fn test_unknown_aspect_lookup_is_an_error() {
    let table = AspectTable::default();
    assert!(table.lookup("Trine").is_ok());
    assert!(table.lookup("semi sextile").is_ok());
    assert!(table.lookup("Hexagram").is_err());
}

proptest! {
    #[test]
    fn prop_separation_is_symmetric(a in -720.0f64..720.0, b in -720.0f64..720.0) {
        let ab = angular_separation(a, b);
        let ba = angular_separation(b, a);
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!((0.0..=180.0).contains(&ab));
    }
}
