//! Boolean union of a glyph's capsules (made by FontLab https://www.fontlab.com/)
//!
//! Every capsule is convex, so the union is computed as one overlay pass.
//! Each capsule edge is cut wherever an edge of another capsule crosses or
//! runs along it, and a piece survives only when no other capsule covers it.
//! Surviving pieces keep their capsule's counter-clockwise direction, so
//! chaining them end to end yields counter-clockwise outer contours and
//! clockwise holes. Each hole then joins the smallest outer contour around
//! it. Disjoint strokes (the dot over an `i`) come out as separate faces.
//!
//! Where two capsules share an edge running the same way, the capsule that
//! comes first in input order keeps it, which keeps the result deterministic.
//!
//! Segment intersection, winding numbers and contour cleanup come from
//! `cavalier_contours`. When the surviving pieces do not close into
//! contours, [`unify`] falls back to the raw capsules so the glyph still
//! renders, and reports why.

use cavalier_contours::core::math::{line_line_intr, LineLineIntr, Vector2};
use cavalier_contours::polyline::{PlineCreation, PlineSource, PlineSourceMut, Polyline as Pline};

use crate::error::UnionError;
use crate::geometry::{signed_area, BoundingBox, Face, Outline, Point};
use crate::stroke::Capsule;

/// Length tolerance at unit scale; grows with the largest coordinate.
const EPSILON: f64 = 1e-9;

/// Piece endpoints closer than this many tolerances are the same vertex.
const SNAP_FACTOR: f64 = 16.0;

/// Largest clockwise turn (sine of the angle) still accepted as convex.
const CONVEXITY_SLACK: f64 = 1e-6;

/// Outcome of unifying one glyph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unified {
    pub outline: Outline,
    pub bbox: BoundingBox,
    /// Set when the union failed and `outline` holds the unmerged capsules.
    pub fallback: Option<UnionError>,
}

/// Union all capsules, degrading to the unmerged set on failure.
pub fn unify(capsules: &[Capsule]) -> Unified {
    let (outline, fallback) = match try_unify(capsules) {
        Ok(outline) => (outline, None),
        Err(err) => (unmerged(capsules), Some(err)),
    };
    let bbox = outline.bbox();
    Unified {
        outline,
        bbox,
        fallback,
    }
}

/// Union all capsules, failing when the input is unusable or the result does not close.
pub fn try_unify(capsules: &[Capsule]) -> Result<Outline, UnionError> {
    if capsules.is_empty() {
        return Ok(Outline::default());
    }

    let eps = tolerance(capsules)?;
    let shapes = capsules
        .iter()
        .map(|c| Shape::new(&c.points, eps))
        .collect::<Result<Vec<_>, _>>()?;

    let pieces = surviving_pieces(&shapes, eps);
    let rings = chain(&pieces, SNAP_FACTOR * eps)?;
    assemble(rings, eps)
}

/// Each capsule as its own face.
pub fn unmerged(capsules: &[Capsule]) -> Outline {
    Outline {
        faces: capsules
            .iter()
            .map(|c| Face::from_ring(oriented(c.points.clone(), true)))
            .collect(),
    }
}

fn tolerance(capsules: &[Capsule]) -> Result<f64, UnionError> {
    let mut scale: f64 = 1.0;
    for p in capsules.iter().flat_map(|c| c.points.iter()) {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(UnionError::NonFinite);
        }
        scale = scale.max(p.x.abs()).max(p.y.abs());
    }
    Ok(EPSILON * scale)
}

/// A capsule prepared for overlay: its usable edges and bounds.
struct Shape {
    edges: Vec<Edge>,
    bbox: BoundingBox,
}

enum Location<'a> {
    Inside,
    Outside,
    Boundary(&'a Edge),
}

impl Shape {
    fn new(points: &[Point], eps: f64) -> Result<Self, UnionError> {
        if points.len() < 3 || signed_area(points) <= eps * eps {
            return Err(UnionError::InvalidInput);
        }

        // Edges shorter than the tolerance have no usable direction.
        let edges: Vec<Edge> = (0..points.len())
            .map(|i| Edge::new(points[i], points[(i + 1) % points.len()]))
            .filter(|e| e.length > eps)
            .collect();
        if edges.len() < 3 {
            return Err(UnionError::InvalidInput);
        }
        let convex = edges.iter().enumerate().all(|(i, edge)| {
            let next = &edges[(i + 1) % edges.len()];
            cross(edge.direction(), next.direction()) >= -CONVEXITY_SLACK
        });
        if !convex {
            return Err(UnionError::InvalidInput);
        }

        let bbox = BoundingBox::from_points(points).ok_or(UnionError::InvalidInput)?;
        Ok(Self { edges, bbox })
    }

    fn locate(&self, p: Point, eps: f64) -> Location<'_> {
        if !overlaps(&self.bbox, &BoundingBox::around(p), eps) {
            return Location::Outside;
        }
        let mut nearest: Option<(&Edge, f64)> = None;
        for edge in &self.edges {
            let offset = edge.offset(p);
            if offset < -eps {
                return Location::Outside;
            }
            if nearest.map_or(true, |(_, best)| offset < best) {
                nearest = Some((edge, offset));
            }
        }
        match nearest {
            Some((edge, offset)) if offset <= eps => Location::Boundary(edge),
            _ => Location::Inside,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Point,
    to: Point,
    length: f64,
}

impl Edge {
    fn new(from: Point, to: Point) -> Self {
        Self {
            from,
            to,
            length: from.distance(to),
        }
    }

    fn at(&self, t: f64) -> Point {
        Point::new(
            self.from.x + t * (self.to.x - self.from.x),
            self.from.y + t * (self.to.y - self.from.y),
        )
    }

    fn vector(&self) -> Point {
        sub(self.to, self.from)
    }

    fn direction(&self) -> Point {
        let v = self.vector();
        Point::new(v.x / self.length, v.y / self.length)
    }

    /// Signed distance of `p` from the edge's line, positive on the left.
    fn offset(&self, p: Point) -> f64 {
        cross(self.vector(), sub(p, self.from)) / self.length
    }

    /// Parameter of `p` projected onto the edge, clamped to it.
    fn project(&self, p: Point) -> f64 {
        (dot(sub(p, self.from), self.vector()) / (self.length * self.length)).clamp(0.0, 1.0)
    }

    fn bbox(&self) -> BoundingBox {
        BoundingBox::around(self.from).including(self.to)
    }
}

/// Cut every capsule edge at its contacts with other capsules and keep the uncovered pieces.
fn surviving_pieces(shapes: &[Shape], eps: f64) -> Vec<Edge> {
    let mut pieces = Vec::new();
    let mut cuts: Vec<f64> = Vec::new();

    for (owner, shape) in shapes.iter().enumerate() {
        for edge in &shape.edges {
            let reach = edge.bbox();
            cuts.clear();
            cuts.extend([0.0, 1.0]);
            for (idx, other) in shapes.iter().enumerate() {
                if idx == owner || !overlaps(&reach, &other.bbox, eps) {
                    continue;
                }
                for other_edge in &other.edges {
                    add_cuts(&mut cuts, edge, other_edge, eps);
                }
            }

            cuts.sort_by(f64::total_cmp);
            cuts.dedup_by(|t, kept| (*t - *kept) * edge.length <= eps);
            if let Some(last) = cuts.last_mut() {
                *last = 1.0;
            }

            for span in cuts.windows(2) {
                let piece = Edge::new(edge.at(span[0]), edge.at(span[1]));
                if piece.length > eps && !covered(shapes, owner, &piece, eps) {
                    pieces.push(piece);
                }
            }
        }
    }
    pieces
}

/// Parameters along `edge` where `other` crosses it or where a shared stretch starts and ends.
fn add_cuts(cuts: &mut Vec<f64>, edge: &Edge, other: &Edge, eps: f64) {
    match line_line_intr(
        vector2(edge.from),
        vector2(edge.to),
        vector2(other.from),
        vector2(other.to),
        eps,
    ) {
        LineLineIntr::TrueIntersect { seg1_t, .. } => cuts.push(seg1_t.clamp(0.0, 1.0)),
        LineLineIntr::Overlapping { seg2_t0, seg2_t1 } => {
            cuts.push(edge.project(other.at(seg2_t0)));
            cuts.push(edge.project(other.at(seg2_t1)));
        }
        LineLineIntr::NoIntersect | LineLineIntr::FalseIntersect { .. } => {}
    }
}

/// Is the piece inside another capsule, or a copy of an edge another capsule already owns?
fn covered(shapes: &[Shape], owner: usize, piece: &Edge, eps: f64) -> bool {
    let mid = piece.at(0.5);
    shapes.iter().enumerate().any(|(idx, shape)| {
        if idx == owner {
            return false;
        }
        match shape.locate(mid, eps) {
            Location::Outside => false,
            Location::Inside => true,
            // Opposite directions mean ink on both sides: an interior seam.
            Location::Boundary(edge) => idx < owner || dot(edge.vector(), piece.vector()) < 0.0,
        }
    })
}

/// Join pieces end to end into closed rings.
///
/// Where several pieces leave one vertex (two regions touching at a point),
/// the walk takes the sharpest left turn so each region closes on its own.
fn chain(pieces: &[Edge], snap: f64) -> Result<Vec<Vec<Point>>, UnionError> {
    let mut nodes: Vec<Point> = Vec::new();
    let mut node = |p: Point| match nodes.iter().position(|n| n.distance(p) <= snap) {
        Some(idx) => idx,
        None => {
            nodes.push(p);
            nodes.len() - 1
        }
    };
    let links: Vec<(usize, usize)> = pieces
        .iter()
        .map(|piece| (node(piece.from), node(piece.to)))
        .filter(|(from, to)| from != to)
        .collect();

    let mut outgoing = vec![Vec::new(); nodes.len()];
    for (idx, &(from, _)) in links.iter().enumerate() {
        outgoing[from].push(idx);
    }
    let heading = |link: usize| sub(nodes[links[link].1], nodes[links[link].0]);

    let mut used = vec![false; links.len()];
    let mut rings = Vec::new();
    for start in 0..links.len() {
        if used[start] {
            continue;
        }
        let origin = links[start].0;
        let mut ring = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            let (from, to) = links[current];
            ring.push(nodes[from]);
            if to == origin {
                break;
            }
            let incoming = heading(current);
            current = outgoing[to]
                .iter()
                .copied()
                .filter(|&next| !used[next])
                .max_by(|&a, &b| turn(incoming, heading(a)).total_cmp(&turn(incoming, heading(b))))
                .ok_or(UnionError::OpenContour {
                    x: nodes[to].x,
                    y: nodes[to].y,
                })?;
        }
        rings.push(ring);
    }
    Ok(rings)
}

/// Sort rings into outers and holes and attach each hole to its face.
fn assemble(rings: Vec<Vec<Point>>, eps: f64) -> Result<Outline, UnionError> {
    let mut outers: Vec<(Pline<f64>, f64)> = Vec::new();
    let mut holes: Vec<Vec<Point>> = Vec::new();
    for ring in rings {
        let pline = simplify(to_pline(&ring), eps);
        if pline.vertex_count() < 3 {
            continue;
        }
        // Slivers below the tolerance are numerical leftovers, not ink.
        let area = pline.area();
        if area > eps {
            outers.push((pline, area));
        } else if area < -eps {
            holes.push(ring_points(&pline));
        }
    }

    let mut faces: Vec<Face> = outers
        .iter()
        .map(|(outer, _)| Face::from_ring(ring_points(outer)))
        .collect();
    for hole in holes {
        let anchor = vector2(longest_edge_midpoint(&hole));
        let owner = outers
            .iter()
            .enumerate()
            .filter(|(_, (outer, _))| outer.winding_number(anchor) != 0)
            .min_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b))
            .map(|(idx, _)| idx)
            .ok_or(UnionError::OrphanHole)?;
        faces[owner].holes.push(hole);
    }

    Ok(Outline { faces })
}

fn simplify(pline: Pline<f64>, eps: f64) -> Pline<f64> {
    match pline.remove_redundant(eps) {
        Some(cleaned) => cleaned,
        None => pline,
    }
}

fn longest_edge_midpoint(ring: &[Point]) -> Point {
    (0..ring.len())
        .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
        .max_by(|a, b| a.0.distance(a.1).total_cmp(&b.0.distance(b.1)))
        .map(|(a, b)| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
        .unwrap_or_default()
}

fn overlaps(a: &BoundingBox, b: &BoundingBox, eps: f64) -> bool {
    a.min_x <= b.max_x + eps
        && b.min_x <= a.max_x + eps
        && a.min_y <= b.max_y + eps
        && b.min_y <= a.max_y + eps
}

/// Counter-clockwise angle from `a` to `b`, in (−π, π].
fn turn(a: Point, b: Point) -> f64 {
    cross(a, b).atan2(dot(a, b))
}

fn sub(a: Point, b: Point) -> Point {
    Point::new(a.x - b.x, a.y - b.y)
}

fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn vector2(p: Point) -> Vector2<f64> {
    Vector2::new(p.x, p.y)
}

fn to_pline(points: &[Point]) -> Pline<f64> {
    let mut pline = Pline::with_capacity(points.len(), true);
    for p in points {
        pline.add(p.x, p.y, 0.0);
    }
    pline
}

fn ring_points(pline: &Pline<f64>) -> Vec<Point> {
    pline.iter_vertexes().map(|v| Point::new(v.x, v.y)).collect()
}

/// Reverse the ring if its winding disagrees with `counter_clockwise`.
fn oriented(mut ring: Vec<Point>, counter_clockwise: bool) -> Vec<Point> {
    if (signed_area(&ring) > 0.0) != counter_clockwise {
        ring.reverse();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ring_contains, Polyline};
    use crate::path::PathParser;
    use crate::stroke::{StrokeExpander, DEFAULT_CAP_SEGMENTS};

    fn capsules(lines: &[Polyline]) -> Vec<Capsule> {
        StrokeExpander::new(0.1, DEFAULT_CAP_SEGMENTS).expand_all(lines)
    }

    fn line(points: &[(f64, f64)]) -> Polyline {
        Polyline::open(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn stroked(data: &str) -> Vec<Capsule> {
        capsules(&PathParser::default().parse(data).polylines)
    }

    /// Grid samples where the outline and the capsules disagree, ignoring
    /// samples that sit right on a capsule edge.
    fn coverage_mismatches(outline: &Outline, caps: &[Capsule]) -> usize {
        let Some(bbox) = BoundingBox::from_points(caps.iter().flat_map(|c| c.points.iter())) else {
            return 0;
        };
        let n = 150;
        let mut mismatches = 0;
        for i in 0..n {
            for j in 0..n {
                let p = Point::new(
                    bbox.min_x + bbox.width() * (i as f64 + 0.37) / n as f64,
                    bbox.min_y + bbox.height() * (j as f64 + 0.61) / n as f64,
                );
                let near_edge = caps.iter().any(|c| {
                    (0..c.points.len()).any(|k| {
                        let edge = Edge::new(c.points[k], c.points[(k + 1) % c.points.len()]);
                        edge.length > 0.0 && edge.at(edge.project(p)).distance(p) < 1e-7
                    })
                });
                if near_edge {
                    continue;
                }
                let truth = caps.iter().any(|c| ring_contains(&c.points, p));
                if truth != outline.contains(p) {
                    mismatches += 1;
                }
            }
        }
        mismatches
    }

    #[test]
    fn empty_input_gives_empty_outline() {
        let unified = unify(&[]);
        assert!(unified.outline.is_empty());
        assert_eq!(unified.bbox, BoundingBox::default());
        assert!(unified.fallback.is_none());
    }

    #[test]
    fn single_capsule_is_one_face() {
        let caps = capsules(&[line(&[(0.0, 0.0), (1.0, 0.0)])]);
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 1);
        assert!((unified.outline.area() - caps[0].area()).abs() < 1e-9);
    }

    #[test]
    fn crossing_strokes_merge() {
        let caps = capsules(&[
            line(&[(0.0, 0.5), (1.0, 0.5)]),
            line(&[(0.5, 0.0), (0.5, 1.0)]),
        ]);
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 1);

        let sum: f64 = caps.iter().map(Capsule::area).sum();
        let area = unified.outline.area();
        assert!(area < sum);
        assert!(area > caps[0].area());
        assert_eq!(coverage_mismatches(&unified.outline, &caps), 0);
    }

    #[test]
    fn disjoint_strokes_stay_separate() {
        let caps = capsules(&[
            line(&[(0.5, 0.0), (0.5, 0.6)]),
            line(&[(0.5, 0.9), (0.5, 0.95)]),
        ]);
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 2);
    }

    #[test]
    fn closed_loop_leaves_a_hole() {
        let square = Polyline::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        let caps = capsules(&[square]);
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 1);
        let face = &unified.outline.faces[0];
        assert_eq!(face.holes.len(), 1);
        assert!(signed_area(&face.outer) > 0.0);
        assert!(signed_area(&face.holes[0]) < 0.0);
        assert_eq!(coverage_mismatches(&unified.outline, &caps), 0);
    }

    #[test]
    fn overlapping_loops_keep_every_counter() {
        let caps =
            stroked("M0 0.2L0.8 0.4L0.8 0.1L0.8 0.4L0.9 0.1L0.5 0.8ZM0.5 0.7L0.9 0.5L0.8 0.8L0.9 0.8Z");
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(coverage_mismatches(&unified.outline, &caps), 0);
    }

    #[test]
    fn stroke_closing_a_counter_around_an_island() {
        // A ring with a dot inside, then a bar across that splits the counter.
        let caps = stroked("M0.1 0.1L0.9 0.1L0.9 0.9L0.1 0.9ZM0.3 0.3L0.32 0.3M0.1 0.5L0.9 0.5");
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 2);
        let holes: usize = unified.outline.faces.iter().map(|f| f.holes.len()).sum();
        assert_eq!(holes, 2);
        assert_eq!(coverage_mismatches(&unified.outline, &caps), 0);
    }

    #[test]
    fn shared_endpoints_and_retraced_segments_merge() {
        for data in [
            "M0.1 0.1L0.3 0.9L0.5 0.4L0.7 0.9L0.9 0.1",
            "M0.5 0.1L0.8 0.3L0.5 0.5L0.2 0.7L0.5 0.9L0.8 0.7L0.5 0.5L0.2 0.3Z",
            "M0.2 0.2L0.8 0.2L0.2 0.2L0.2 0.8",
            "M0.2 0.5L0.8 0.5M0.3 0.5L0.6 0.5",
        ] {
            let caps = stroked(data);
            let unified = unify(&caps);
            assert_eq!(unified.fallback, None, "{data}");
            assert_eq!(unified.outline.faces.len(), 1, "{data}");
            assert_eq!(coverage_mismatches(&unified.outline, &caps), 0, "{data}");
        }
    }

    #[test]
    fn figure_eight_has_two_counters() {
        let caps = stroked("M0.5 0.1L0.8 0.3L0.5 0.5L0.2 0.7L0.5 0.9L0.8 0.7L0.5 0.5L0.2 0.3Z");
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 1);
        assert_eq!(unified.outline.faces[0].holes.len(), 2);
    }

    #[test]
    fn touching_parallel_strokes_merge_along_the_seam() {
        let caps = capsules(&[
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(0.0, 0.1), (1.0, 0.1)]),
        ]);
        let unified = unify(&caps);
        assert!(unified.fallback.is_none());
        assert_eq!(unified.outline.faces.len(), 1);
        assert!(unified.outline.faces[0].holes.is_empty());
    }

    #[test]
    fn unmerged_keeps_every_capsule() {
        let caps = capsules(&[line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])]);
        let outline = unmerged(&caps);
        assert_eq!(outline.faces.len(), caps.len());
        assert!(outline.faces.iter().all(|f| signed_area(&f.outer) > 0.0));
    }

    #[test]
    fn degenerate_ring_falls_back() {
        let bogus = Capsule {
            points: vec![Point::new(0.0, 0.0)],
        };
        let unified = unify(&[bogus.clone(), bogus]);
        assert_eq!(unified.fallback, Some(UnionError::InvalidInput));
        assert_eq!(unified.outline.faces.len(), 2);
    }

    #[test]
    fn non_finite_capsule_falls_back() {
        let mut caps = capsules(&[line(&[(0.0, 0.0), (1.0, 0.0)])]);
        caps[0].points[3].x = f64::NAN;
        assert_eq!(unify(&caps).fallback, Some(UnionError::NonFinite));
    }

    #[test]
    fn concave_capsule_is_rejected() {
        let dart = Capsule {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.5),
                Point::new(0.0, 1.0),
                Point::new(0.3, 0.5),
            ],
        };
        assert_eq!(try_unify(&[dart]), Err(UnionError::InvalidInput));
    }
}
