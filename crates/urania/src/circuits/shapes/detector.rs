//! Shape matching over conjunction-collapsed representative nodes.

use crate::aspects::{AspectKind, AspectStatus, AspectTable};
use crate::circuits::cluster::{ClusterId, ConjunctionClusters};
use crate::circuits::graph::{AspectGraph, Pattern};
use crate::circuits::shapes::remainder::remainder_shapes;
use crate::circuits::shapes::special::find_special;
use crate::circuits::shapes::suppression::{apply_suppression, order_shapes};
use crate::circuits::shapes::types::{MemberSet, Shape, ShapeEdge, ShapeKind, Suppression};
use crate::config::Settings;
use crate::ephemeris::PositionMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use AspectKind::{Opposition, Quincunx, Sextile, Square, Trine};

/// Which aspect tier a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Present aspects only
    Strict,
    /// Present or near aspects; resulting shapes are flagged approximate
    Approx,
}

fn pair(a: ClusterId, b: ClusterId) -> (ClusterId, ClusterId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Representative-level view of a set of bodies.
pub(crate) struct RepContext<'a> {
    positions: &'a PositionMap,
    table: &'a AspectTable,
    graph: &'a AspectGraph,
    pub(crate) clusters: ConjunctionClusters,
    links: HashMap<(ClusterId, ClusterId), Vec<AspectKind>>,
    /// Per-kind `len × len` status grids, filled once at construction
    statuses: HashMap<AspectKind, Vec<AspectStatus>>,
    mode: MatchMode,
}

impl<'a> RepContext<'a> {
    pub(crate) fn new<'m, I>(
        positions: &'a PositionMap,
        graph: &'a AspectGraph,
        settings: &'a Settings,
        members: I,
        mode: MatchMode,
    ) -> Self
    where
        I: IntoIterator<Item = &'m str>,
    {
        let clusters = ConjunctionClusters::build(positions, members, settings.cluster_orb);
        let mut links: HashMap<(ClusterId, ClusterId), Vec<AspectKind>> = HashMap::new();
        for edge in graph.edges() {
            let (Some(ra), Some(rb)) = (clusters.rep_of(&edge.a), clusters.rep_of(&edge.b)) else {
                continue;
            };
            if ra == rb {
                continue;
            }
            let kinds = links.entry(pair(ra, rb)).or_default();
            if !kinds.contains(&edge.aspect) {
                kinds.push(edge.aspect);
            }
        }

        let mut ctx = Self {
            positions,
            table: &settings.aspects,
            graph,
            clusters,
            links,
            statuses: HashMap::new(),
            mode,
        };
        let n = ctx.clusters.len();
        for kind in AspectKind::ALL {
            let mut grid = vec![AspectStatus::Absent; n * n];
            for i in 0..n {
                for j in (i + 1)..n {
                    let status = ctx.compute_status(ClusterId(i), ClusterId(j), kind);
                    grid[i * n + j] = status;
                    grid[j * n + i] = status;
                }
            }
            ctx.statuses.insert(kind, grid);
        }
        ctx
    }

    pub(crate) fn reps(&self) -> Vec<ClusterId> {
        self.clusters.ids().collect()
    }

    pub(crate) fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Major edges between representatives, in a stable order.
    pub(crate) fn rep_edges(&self) -> Vec<(ClusterId, ClusterId, AspectKind)> {
        let mut edges: Vec<(ClusterId, ClusterId, AspectKind)> = self
            .links
            .iter()
            .flat_map(|(&(a, b), kinds)| kinds.iter().map(move |kind| (a, b, *kind)))
            .collect();
        edges.sort();
        edges
    }

    fn member_longitudes(&self, id: ClusterId) -> impl Iterator<Item = f64> + '_ {
        self.clusters
            .members_of(id)
            .iter()
            .filter_map(move |m| self.positions.get(m))
    }

    fn any_member_pair(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> bool {
        self.member_longitudes(a).any(|la| {
            self.member_longitudes(b)
                .any(|lb| self.table.status_between(la, lb, kind).is_present())
        })
    }

    /// Status of `kind` between two representatives.
    pub(crate) fn status(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> AspectStatus {
        let n = self.clusters.len();
        if a.0 >= n || b.0 >= n {
            return AspectStatus::Absent;
        }
        self.statuses
            .get(&kind)
            .and_then(|grid| grid.get(a.0 * n + b.0))
            .copied()
            .unwrap_or(AspectStatus::Absent)
    }

    /// Major kinds are present only through the major-aspect graph; anything
    /// else within the widened orb of the cluster longitudes is near.
    fn compute_status(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> AspectStatus {
        if a == b {
            return AspectStatus::Absent;
        }
        let present = if kind.is_major() {
            self.links
                .get(&pair(a, b))
                .is_some_and(|kinds| kinds.contains(&kind))
        } else {
            self.any_member_pair(a, b, kind)
        };
        if present {
            return AspectStatus::Present;
        }
        match (self.clusters.longitude(a), self.clusters.longitude(b)) {
            (Some(la), Some(lb)) if self.table.status_between(la, lb, kind).is_near() => {
                AspectStatus::Near
            }
            _ => AspectStatus::Absent,
        }
    }

    /// `Some(approx)` when the mode accepts the aspect, `None` otherwise.
    pub(crate) fn accept(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> Option<bool> {
        match (self.status(a, b, kind), self.mode) {
            (AspectStatus::Present, _) => Some(false),
            (AspectStatus::Near, MatchMode::Approx) => Some(true),
            _ => None,
        }
    }

    pub(crate) fn has(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> bool {
        self.accept(a, b, kind).is_some()
    }

    /// The body pair that best represents a representative-level edge.
    pub(crate) fn edge_endpoints(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> (String, String) {
        let members_a = self.clusters.members_of(a);
        let members_b = self.clusters.members_of(b);
        for ma in members_a {
            for mb in members_b {
                let carries = if kind.is_major() {
                    self.graph.has_aspect(ma, mb, kind)
                } else {
                    match (self.positions.get(ma), self.positions.get(mb)) {
                        (Some(la), Some(lb)) => self.table.status_between(la, lb, kind).is_present(),
                        _ => false,
                    }
                };
                if carries {
                    return (ma.clone(), mb.clone());
                }
            }
        }
        (
            members_a.first().cloned().unwrap_or_default(),
            members_b.first().cloned().unwrap_or_default(),
        )
    }

    pub(crate) fn shape_edge(&self, a: ClusterId, b: ClusterId, kind: AspectKind) -> ShapeEdge {
        let (name_a, name_b) = self.edge_endpoints(a, b, kind);
        ShapeEdge {
            a: name_a,
            b: name_b,
            aspect: kind,
            approx: self.accept(a, b, kind) == Some(true),
        }
    }

    pub(crate) fn count(&self, nodes: &[ClusterId], kind: AspectKind) -> usize {
        let mut n = 0;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if self.has(nodes[i], nodes[j], kind) {
                    n += 1;
                }
            }
        }
        n
    }
}

/// A rule match at representative level, before member expansion.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) kind: ShapeKind,
    pub(crate) nodes: Vec<ClusterId>,
    pub(crate) edges: Vec<(ClusterId, ClusterId, AspectKind)>,
    pub(crate) suppress: Vec<(ShapeKind, Vec<ClusterId>)>,
    pub(crate) keep: Vec<(ShapeKind, Vec<ClusterId>)>,
}

impl Candidate {
    pub(crate) fn new(
        kind: ShapeKind,
        nodes: Vec<ClusterId>,
        edges: Vec<(ClusterId, ClusterId, AspectKind)>,
    ) -> Self {
        Self {
            kind,
            nodes,
            edges,
            suppress: Vec::new(),
            keep: Vec::new(),
        }
    }

    pub(crate) fn suppressing(mut self, kind: ShapeKind, nodes: &[&[ClusterId]]) -> Self {
        self.suppress
            .extend(nodes.iter().map(|set| (kind, set.to_vec())));
        self
    }

    pub(crate) fn keeping(mut self, kind: ShapeKind, nodes: &[&[ClusterId]]) -> Self {
        self.keep.extend(nodes.iter().map(|set| (kind, set.to_vec())));
        self
    }
}

/// All `k`-element combinations of `items`, in lexicographic index order.
pub(crate) fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut idx: Vec<usize> = (0..k).collect();
    let mut out = Vec::new();
    loop {
        out.push(idx.iter().map(|&i| items[i]).collect());
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] != i + n - k {
                break;
            }
        }
        idx[i] += 1;
        for j in (i + 1)..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// All orderings of `items`.
pub(crate) fn permutations<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

fn find_envelopes(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for quint in combinations(reps, 5) {
        if ctx.count(&quint, Opposition) < 2
            || ctx.count(&quint, Sextile) < 4
            || ctx.count(&quint, Trine) < 2
        {
            continue;
        }
        for order in permutations(&quint) {
            let &[a, b, c, d, e] = order.as_slice() else {
                continue;
            };
            let edges = vec![
                (a, b, Sextile),
                (b, c, Sextile),
                (c, d, Sextile),
                (d, e, Sextile),
                (a, d, Opposition),
                (b, e, Opposition),
                (a, e, Trine),
                (b, d, Trine),
            ];
            if !edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                continue;
            }
            out.push(
                Candidate::new(ShapeKind::Envelope, vec![a, b, c, d, e], edges)
                    .suppressing(ShapeKind::SextileWedge, &[&[a, b, c], &[c, d, e]])
                    .suppressing(ShapeKind::Kite, &[&[a, b, c, e], &[a, c, d, e]])
                    .suppressing(ShapeKind::Cradle, &[&[a, b, c, d], &[b, c, d, e]])
                    .suppressing(
                        ShapeKind::Wedge,
                        &[
                            &[a, b, d],
                            &[c, d, e],
                            &[a, c, d],
                            &[a, b, e],
                            &[a, d, e],
                            &[b, c, e],
                            &[b, d, e],
                        ],
                    )
                    .keeping(ShapeKind::SextileWedge, &[&[b, c, d]])
                    .keeping(ShapeKind::MysticRectangle, &[&[a, b, d, e]])
                    .keeping(ShapeKind::GrandTrine, &[&[a, c, e]]),
            );
            break;
        }
    }
}

fn find_grand_crosses(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for quad in combinations(reps, 4) {
        if ctx.count(&quad, Opposition) < 2 || ctx.count(&quad, Square) < 4 {
            continue;
        }
        for order in permutations(&quad) {
            let &[a, b, c, d] = order.as_slice() else {
                continue;
            };
            let edges = vec![
                (a, c, Opposition),
                (b, d, Opposition),
                (a, b, Square),
                (b, c, Square),
                (c, d, Square),
                (d, a, Square),
            ];
            if !edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                continue;
            }
            out.push(
                Candidate::new(ShapeKind::GrandCross, vec![a, b, c, d], edges).suppressing(
                    ShapeKind::TSquare,
                    &[&[a, b, c], &[b, c, d], &[c, d, a], &[d, a, b]],
                ),
            );
            break;
        }
    }
}

fn find_mystic_rectangles(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for quad in combinations(reps, 4) {
        if ctx.count(&quad, Opposition) < 2
            || ctx.count(&quad, Sextile) < 2
            || ctx.count(&quad, Trine) < 2
        {
            continue;
        }
        for order in permutations(&quad) {
            let &[a, b, c, d] = order.as_slice() else {
                continue;
            };
            let edges = vec![
                (a, c, Opposition),
                (b, d, Opposition),
                (a, b, Sextile),
                (c, d, Sextile),
                (a, d, Trine),
                (b, c, Trine),
            ];
            if !edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                continue;
            }
            out.push(
                Candidate::new(ShapeKind::MysticRectangle, vec![a, b, c, d], edges).suppressing(
                    ShapeKind::Wedge,
                    &[&[a, b, c], &[a, b, d], &[b, c, d], &[a, c, d]],
                ),
            );
            break;
        }
    }
}

fn find_cradles(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for quad in combinations(reps, 4) {
        if ctx.count(&quad, Opposition) == 0
            || ctx.count(&quad, Sextile) < 3
            || ctx.count(&quad, Trine) < 2
        {
            continue;
        }
        for order in permutations(&quad) {
            let &[a, b, c, d] = order.as_slice() else {
                continue;
            };
            let edges = vec![
                (a, b, Sextile),
                (b, c, Sextile),
                (c, d, Sextile),
                (a, d, Opposition),
                (a, c, Trine),
                (b, d, Trine),
            ];
            if !edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
                continue;
            }
            out.push(
                Candidate::new(ShapeKind::Cradle, vec![a, b, c, d], edges)
                    .suppressing(ShapeKind::Wedge, &[&[a, b, d], &[a, c, d]])
                    .suppressing(ShapeKind::SextileWedge, &[&[a, b, c], &[b, c, d]]),
            );
            break;
        }
    }
}

fn find_kites(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for quad in combinations(reps, 4) {
        for apex_idx in 0..quad.len() {
            let apex = quad[apex_idx];
            let trio: Vec<ClusterId> = quad
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != apex_idx)
                .map(|(_, id)| *id)
                .collect();
            let &[x, y, z] = trio.as_slice() else {
                continue;
            };
            if !(ctx.has(x, y, Trine) && ctx.has(y, z, Trine) && ctx.has(x, z, Trine)) {
                continue;
            }
            let opposed: Vec<ClusterId> = trio
                .iter()
                .copied()
                .filter(|t| ctx.has(apex, *t, Opposition))
                .collect();
            let &[tail] = opposed.as_slice() else {
                continue;
            };
            let wings: Vec<ClusterId> = trio.iter().copied().filter(|t| *t != tail).collect();
            let &[r0, r1] = wings.as_slice() else {
                continue;
            };
            if !(ctx.has(apex, r0, Sextile) && ctx.has(apex, r1, Sextile)) {
                continue;
            }
            let edges = vec![
                (x, y, Trine),
                (y, z, Trine),
                (x, z, Trine),
                (apex, tail, Opposition),
                (apex, r0, Sextile),
                (apex, r1, Sextile),
            ];
            out.push(
                Candidate::new(ShapeKind::Kite, vec![x, y, z, apex], edges)
                    .suppressing(ShapeKind::Wedge, &[&[apex, tail, r0], &[apex, tail, r1]])
                    .suppressing(ShapeKind::SextileWedge, &[&[apex, r0, r1]])
                    .suppressing(ShapeKind::GrandTrine, &[&[x, y, z]]),
            );
            break;
        }
    }
}

fn find_grand_trines(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for trio in combinations(reps, 3) {
        let &[a, b, c] = trio.as_slice() else {
            continue;
        };
        let edges = vec![(a, b, Trine), (b, c, Trine), (a, c, Trine)];
        if edges.iter().all(|(x, y, k)| ctx.has(*x, *y, *k)) {
            out.push(Candidate::new(ShapeKind::GrandTrine, trio, edges));
        }
    }
}

/// Apex shapes: a base pair joined by `base`, the apex linked to both by `arm`.
pub(crate) fn find_apex_shapes(
    ctx: &RepContext,
    reps: &[ClusterId],
    kind: ShapeKind,
    base: AspectKind,
    arm: AspectKind,
    out: &mut Vec<Candidate>,
) {
    for trio in combinations(reps, 3) {
        for apex_idx in 0..3 {
            let apex = trio[apex_idx];
            let (x, y) = (trio[(apex_idx + 1) % 3], trio[(apex_idx + 2) % 3]);
            if ctx.has(x, y, base) && ctx.has(apex, x, arm) && ctx.has(apex, y, arm) {
                let edges = vec![(x, y, base), (apex, x, arm), (apex, y, arm)];
                out.push(Candidate::new(kind, vec![x, y, apex], edges));
                break;
            }
        }
    }
}

/// Label each pair of a trio with the first of Opposition, Trine, Sextile it carries.
fn label_pairs(ctx: &RepContext, trio: &[ClusterId]) -> Vec<(ClusterId, ClusterId, AspectKind)> {
    let mut labels = Vec::new();
    for i in 0..trio.len() {
        for j in (i + 1)..trio.len() {
            if let Some(kind) = [Opposition, Trine, Sextile]
                .into_iter()
                .find(|k| ctx.has(trio[i], trio[j], *k))
            {
                labels.push((trio[i], trio[j], kind));
            }
        }
    }
    labels
}

fn find_wedges(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for trio in combinations(reps, 3) {
        let labels = label_pairs(ctx, &trio);
        let count = |kind: AspectKind| labels.iter().filter(|(_, _, k)| *k == kind).count();
        if count(Opposition) == 1 && count(Trine) == 1 && count(Sextile) == 1 {
            out.push(Candidate::new(ShapeKind::Wedge, trio, labels));
        }
    }
}

fn find_sextile_wedges(ctx: &RepContext, reps: &[ClusterId], out: &mut Vec<Candidate>) {
    for trio in combinations(reps, 3) {
        let labels = label_pairs(ctx, &trio);
        let count = |kind: AspectKind| labels.iter().filter(|(_, _, k)| *k == kind).count();
        if count(Opposition) == 0 && count(Trine) == 1 && count(Sextile) == 2 {
            out.push(Candidate::new(ShapeKind::SextileWedge, trio, labels));
        }
    }
}

/// Run every shape rule over the context's representatives, largest shapes first.
pub(crate) fn match_rules(ctx: &RepContext) -> Vec<Candidate> {
    let reps = ctx.reps();
    let mut out = Vec::new();
    if reps.len() < 3 {
        return out;
    }
    find_envelopes(ctx, &reps, &mut out);
    find_grand_crosses(ctx, &reps, &mut out);
    find_mystic_rectangles(ctx, &reps, &mut out);
    find_cradles(ctx, &reps, &mut out);
    find_kites(ctx, &reps, &mut out);
    find_grand_trines(ctx, &reps, &mut out);
    find_apex_shapes(ctx, &reps, ShapeKind::TSquare, Opposition, Square, &mut out);
    find_wedges(ctx, &reps, &mut out);
    find_sextile_wedges(ctx, &reps, &mut out);
    find_apex_shapes(ctx, &reps, ShapeKind::Yod, Sextile, Quincunx, &mut out);
    out
}

fn expand_rules(
    clusters: &ConjunctionClusters,
    rules: &[(ShapeKind, Vec<ClusterId>)],
) -> BTreeMap<ShapeKind, BTreeSet<MemberSet>> {
    let mut map: BTreeMap<ShapeKind, BTreeSet<MemberSet>> = BTreeMap::new();
    for (kind, nodes) in rules {
        let members: MemberSet = clusters.expand(nodes).into_iter().collect();
        map.entry(*kind).or_default().insert(members);
    }
    map
}

/// Stateful detector; the dedup set spans every pass of one chart.
pub struct ShapeDetector<'a> {
    positions: &'a PositionMap,
    graph: &'a AspectGraph,
    settings: &'a Settings,
    seen: HashSet<(ShapeKind, MemberSet)>,
}

impl<'a> ShapeDetector<'a> {
    pub fn new(positions: &'a PositionMap, graph: &'a AspectGraph, settings: &'a Settings) -> Self {
        Self {
            positions,
            graph,
            settings,
            seen: HashSet::new(),
        }
    }

    /// Turn rule matches into shapes, skipping (kind, members) keys already seen.
    fn realize<F>(
        &mut self,
        ctx: &RepContext,
        candidates: Vec<Candidate>,
        mut next_id: usize,
        parent_of: F,
    ) -> (Vec<Shape>, usize)
    where
        F: Fn(&[String]) -> usize,
    {
        let mut shapes = Vec::new();
        for candidate in candidates {
            let members = ctx.clusters.expand(&candidate.nodes);
            let key: MemberSet = members.iter().cloned().collect();
            if !self.seen.insert((candidate.kind, key)) {
                continue;
            }

            let edges = candidate
                .edges
                .iter()
                .map(|(a, b, kind)| ctx.shape_edge(*a, *b, *kind))
                .collect();
            let rule = Suppression {
                suppress: expand_rules(&ctx.clusters, &candidate.suppress),
                keep: expand_rules(&ctx.clusters, &candidate.keep),
            };

            log::trace!("Shape #{} {}: {:?}", next_id, candidate.kind, members);
            shapes.push(Shape {
                id: next_id,
                kind: candidate.kind,
                parent: parent_of(&members),
                members,
                edges,
                approx: ctx.mode() == MatchMode::Approx,
                remainder: false,
                suppresses: (!rule.is_empty()).then_some(rule),
            });
            next_id += 1;
        }
        (shapes, next_id)
    }

    /// Detect shapes among `members` of one pattern.
    ///
    /// Bodies missing from the position map are ignored. Returns the shapes and
    /// the next free shape id.
    pub fn detect_for_pattern<'m, I>(
        &mut self,
        members: I,
        parent: usize,
        next_id: usize,
        mode: MatchMode,
    ) -> (Vec<Shape>, usize)
    where
        I: IntoIterator<Item = &'m str>,
    {
        let ctx = RepContext::new(self.positions, self.graph, self.settings, members, mode);
        let candidates = match_rules(&ctx);
        self.realize(&ctx, candidates, next_id, |_| parent)
    }

    /// Yods, Wide Yods, Unnamed triangles and Lightning Bolts over the whole chart.
    pub fn detect_special(&mut self, patterns: &[Pattern], next_id: usize) -> (Vec<Shape>, usize) {
        let ctx = RepContext::new(
            self.positions,
            self.graph,
            self.settings,
            self.positions.names(),
            MatchMode::Strict,
        );
        let candidates = find_special(&ctx);
        self.realize(&ctx, candidates, next_id, |members| {
            special_parent(members, patterns)
        })
    }

    /// Full chart protocol: strict, approximate, special, suppression, remainders.
    pub fn detect_chart(mut self, patterns: &[Pattern]) -> Vec<Shape> {
        let mut shapes = Vec::new();
        let mut next_id = 0;

        for (idx, pattern) in patterns.iter().enumerate() {
            let (found, next) =
                self.detect_for_pattern(pattern.iter().map(String::as_str), idx, next_id, MatchMode::Strict);
            shapes.extend(found);
            next_id = next;
        }

        let claimed: HashSet<String> = shapes
            .iter()
            .flat_map(|s| s.members.iter().cloned())
            .collect();
        for (idx, pattern) in patterns.iter().enumerate() {
            let leftovers: Vec<&str> = pattern
                .iter()
                .filter(|m| !claimed.contains(*m))
                .map(String::as_str)
                .collect();
            if leftovers.len() < 3 {
                continue;
            }
            let (found, next) = self.detect_for_pattern(leftovers, idx, next_id, MatchMode::Approx);
            shapes.extend(found);
            next_id = next;
        }

        let (found, next) = self.detect_special(patterns, next_id);
        shapes.extend(found);
        next_id = next;

        let mut shapes = apply_suppression(shapes);
        let remainders =
            remainder_shapes(self.positions, self.graph, self.settings, patterns, &shapes, next_id);
        shapes.extend(remainders);

        log::debug!(
            "Shape detection: {} shapes over {} patterns",
            shapes.len(),
            patterns.len()
        );
        order_shapes(shapes)
    }
}

/// First pattern holding every member, else the first holding at least two.
fn special_parent(members: &[String], patterns: &[Pattern]) -> usize {
    patterns
        .iter()
        .position(|p| members.iter().all(|m| p.contains(m)))
        .or_else(|| {
            patterns
                .iter()
                .position(|p| members.iter().filter(|m| p.contains(*m)).count() >= 2)
        })
        .unwrap_or(0)
}

/// Detect every shape of a chart.
pub fn detect_shapes(
    positions: &PositionMap,
    patterns: &[Pattern],
    graph: &AspectGraph,
    settings: &Settings,
) -> Vec<Shape> {
    ShapeDetector::new(positions, graph, settings).detect_chart(patterns)
}
