//! Suppression of redundant sub-shapes and final shape ordering.

use crate::circuits::shapes::types::{MemberSet, Shape, ShapeKind};
use std::collections::HashSet;

/// Drop shapes that a larger shape in the same pattern makes redundant.
///
/// A shape is only suppressed by one of equal or higher priority, never when
/// any shape keeps it, and Lightning Bolts are never suppressed.
pub fn apply_suppression(shapes: Vec<Shape>) -> Vec<Shape> {
    let protected: HashSet<(ShapeKind, MemberSet)> = shapes
        .iter()
        .filter_map(|s| s.suppresses.as_ref())
        .flat_map(|rule| {
            rule.keep
                .iter()
                .flat_map(|(kind, sets)| sets.iter().map(move |set| (*kind, set.clone())))
        })
        .collect();
    let keys: Vec<(ShapeKind, MemberSet)> = shapes.iter().map(Shape::key).collect();
    let mut dropped = vec![false; shapes.len()];

    for (i, big) in shapes.iter().enumerate() {
        let Some(rule) = &big.suppresses else {
            continue;
        };
        for (j, small) in shapes.iter().enumerate() {
            if i == j
                || dropped[j]
                || small.parent != big.parent
                || small.kind == ShapeKind::LightningBolt
                || small.kind.priority() > big.kind.priority()
            {
                continue;
            }
            let key = &keys[j];
            if protected.contains(key) {
                continue;
            }
            if rule
                .suppress
                .get(&small.kind)
                .is_some_and(|sets| sets.contains(&key.1))
            {
                log::trace!("{} #{} suppresses {} #{}", big.kind, big.id, small.kind, small.id);
                dropped[j] = true;
            }
        }
    }

    shapes
        .into_iter()
        .zip(dropped)
        .filter_map(|(shape, gone)| (!gone).then_some(shape))
        .collect()
}

/// Sort by id with remainders last; shapes an Envelope keeps follow that Envelope.
pub fn order_shapes(shapes: Vec<Shape>) -> Vec<Shape> {
    let (mut regular, mut remainders): (Vec<Shape>, Vec<Shape>) =
        shapes.into_iter().partition(|s| !s.remainder);
    regular.sort_by_key(|s| s.id);
    remainders.sort_by_key(|s| s.id);

    let mut placed = vec![false; regular.len()];
    let mut order = Vec::with_capacity(regular.len());
    for i in 0..regular.len() {
        if placed[i] {
            continue;
        }
        placed[i] = true;
        order.push(i);

        let envelope = &regular[i];
        if envelope.kind != ShapeKind::Envelope {
            continue;
        }
        let Some(rule) = envelope.suppresses.as_ref() else {
            continue;
        };
        for j in 0..regular.len() {
            let kept = &regular[j];
            if !placed[j]
                && kept.parent == envelope.parent
                && rule.keeps(kept.kind, &kept.member_set())
            {
                placed[j] = true;
                order.push(j);
            }
        }
    }

    let mut slots: Vec<Option<Shape>> = regular.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .chain(remainders)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::shapes::types::Suppression;
    use std::collections::{BTreeMap, BTreeSet};

    fn shape(id: usize, kind: ShapeKind, parent: usize, members: &[&str]) -> Shape {
        Shape {
            id,
            kind,
            parent,
            members: members.iter().map(|m| m.to_string()).collect(),
            edges: Vec::new(),
            approx: false,
            remainder: false,
            suppresses: None,
        }
    }

    fn set(members: &[&str]) -> MemberSet {
        members.iter().map(|m| m.to_string()).collect()
    }

    fn rule(kind: ShapeKind, members: &[&str]) -> BTreeMap<ShapeKind, BTreeSet<MemberSet>> {
        BTreeMap::from([(kind, BTreeSet::from([set(members)]))])
    }

    #[test]
    fn test_suppression_respects_parent_and_keep() {
        let mut cross = shape(0, ShapeKind::GrandCross, 0, &["A", "B", "C", "D"]);
        cross.suppresses = Some(Suppression {
            suppress: rule(ShapeKind::TSquare, &["A", "B", "C"]),
            keep: BTreeMap::new(),
        });
        let same_parent = shape(1, ShapeKind::TSquare, 0, &["C", "B", "A"]);
        let other_parent = shape(2, ShapeKind::TSquare, 1, &["A", "B", "C"]);

        let kept = apply_suppression(vec![cross.clone(), same_parent, other_parent]);
        let ids: Vec<usize> = kept.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 2]);

        let mut guard = shape(3, ShapeKind::Envelope, 0, &["A", "B", "C", "D", "E"]);
        guard.suppresses = Some(Suppression {
            suppress: BTreeMap::new(),
            keep: rule(ShapeKind::TSquare, &["A", "B", "C"]),
        });
        let kept = apply_suppression(vec![
            cross,
            shape(1, ShapeKind::TSquare, 0, &["A", "B", "C"]),
            guard,
        ]);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_lower_priority_cannot_suppress() {
        let mut trine = shape(0, ShapeKind::GrandTrine, 0, &["A", "B", "C"]);
        trine.suppresses = Some(Suppression {
            suppress: rule(ShapeKind::Kite, &["A", "B", "C", "D"]),
            keep: BTreeMap::new(),
        });
        let kite = shape(1, ShapeKind::Kite, 0, &["A", "B", "C", "D"]);
        assert_eq!(apply_suppression(vec![trine, kite]).len(), 2);
    }

    #[test]
    fn test_order_puts_envelope_keeps_after_envelope() {
        let mut envelope = shape(2, ShapeKind::Envelope, 0, &["A", "B", "C", "D", "E"]);
        envelope.suppresses = Some(Suppression {
            suppress: BTreeMap::new(),
            keep: rule(ShapeKind::GrandTrine, &["A", "C", "E"]),
        });
        let mut rest = shape(0, ShapeKind::Remainder, 0, &["X", "Y"]);
        rest.remainder = true;
        let shapes = vec![
            shape(5, ShapeKind::GrandTrine, 0, &["A", "C", "E"]),
            rest,
            shape(3, ShapeKind::TSquare, 0, &["F", "G", "H"]),
            envelope,
        ];
        let ids: Vec<usize> = order_shapes(shapes).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 5, 3, 0]);
    }
}
