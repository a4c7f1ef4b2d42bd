//! Chart-wide shapes built on minor aspects.

use crate::aspects::AspectKind::{Quincunx, Sesquisquare, Sextile, Square, Trine};
use crate::circuits::shapes::detector::{
    combinations, find_apex_shapes, permutations, Candidate, RepContext,
};
use crate::circuits::shapes::types::ShapeKind;

/// Yods, Wide Yods, Unnamed triangles and Lightning Bolts.
///
/// Their arms are minor aspects, so the bodies rarely share one pattern.
pub(crate) fn find_special(ctx: &RepContext) -> Vec<Candidate> {
    let reps = ctx.reps();
    let mut out = Vec::new();
    if reps.len() < 3 {
        return out;
    }

    find_apex_shapes(ctx, &reps, ShapeKind::Yod, Sextile, Quincunx, &mut out);
    find_apex_shapes(ctx, &reps, ShapeKind::WideYod, Square, Sesquisquare, &mut out);

    for trio in combinations(&reps, 3) {
        for order in permutations(&trio) {
            let &[a, b, c] = order.as_slice() else {
                continue;
            };
            let edges = vec![(a, b, Square), (a, c, Trine), (b, c, Quincunx)];
            if edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                out.push(Candidate::new(ShapeKind::Unnamed, vec![a, b, c], edges));
                break;
            }
        }
    }

    // Two Unnamed triangles hinged on one quincunx
    for quad in combinations(&reps, 4) {
        if ctx.count(&quad, Quincunx) == 0
            || ctx.count(&quad, Square) < 2
            || ctx.count(&quad, Trine) < 2
        {
            continue;
        }
        for order in permutations(&quad) {
            let &[q1, q2, r1, r2] = order.as_slice() else {
                continue;
            };
            let edges = vec![
                (q1, q2, Quincunx),
                (q1, r1, Square),
                (q2, r2, Square),
                (q1, r2, Trine),
                (q2, r1, Trine),
            ];
            if !edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                continue;
            }
            out.push(
                Candidate::new(ShapeKind::LightningBolt, vec![q1, q2, r1, r2], edges)
                    .suppressing(ShapeKind::Unnamed, &[&[q1, q2, r1], &[q1, q2, r2]]),
            );
            break;
        }
    }

    out
}
