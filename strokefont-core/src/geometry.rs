//! Points, polylines and bounding boxes shared by every pipeline stage (made by FontLab https://www.fontlab.com/)

use serde::{Deserialize, Serialize};

/// A coordinate in design space (normalized or font units depending on the stage).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One pen stroke: the points between a move and the next move or close.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive point pairs, plus the closing pair back to the start for closed polylines.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(&first), Some(&last)) if self.points.len() > 1 => Some((last, first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }

    /// Mirror a y-down polyline in the unit box into y-up space.
    pub fn flip_y(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x, 1.0 - p.y))
                .collect(),
            closed: self.closed,
        }
    }
}

/// Axis-aligned bounding box. An empty box collapses to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::around(*first), |bbox, p| bbox.including(*p)))
    }

    /// The zero-size box at `p`.
    pub fn around(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn including(self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            min_y: self.min_y.min(p.y),
            max_x: self.max_x.max(p.x),
            max_y: self.max_y.max(p.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }
}

/// One connected region: a counter-clockwise outer ring and clockwise holes.
/// Rings are implicitly closed; the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Face {
    pub outer: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point>>,
}

impl Face {
    pub fn from_ring(outer: Vec<Point>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Filled area: outer ring minus holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        signed_area(&self.outer).abs() - holes
    }

    /// Inside the outer ring and outside every hole.
    pub fn contains(&self, p: Point) -> bool {
        ring_contains(&self.outer, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }

    pub fn contours(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

/// The filled shape of one glyph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline {
    pub faces: Vec<Face>,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn contours(&self) -> impl Iterator<Item = &[Point]> {
        self.faces.iter().flat_map(Face::contours)
    }

    pub fn area(&self) -> f64 {
        self.faces.iter().map(Face::area).sum()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.faces.iter().any(|f| f.contains(p))
    }

    /// Bounds of the ink; the zero box when there is none.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_points(self.faces.iter().flat_map(|f| f.outer.iter())).unwrap_or_default()
    }

    /// Apply an orientation-preserving transform to every point.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Outline {
        let ring = |r: &Vec<Point>| r.iter().copied().map(&f).collect::<Vec<_>>();
        Outline {
            faces: self
                .faces
                .iter()
                .map(|face| Face {
                    outer: ring(&face.outer),
                    holes: face.holes.iter().map(&ring).collect(),
                })
                .collect(),
        }
    }
}

/// Signed shoelace area; positive for counter-clockwise rings in y-up space.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

/// Even-odd point-in-ring test. Points exactly on an edge may land either way.
pub fn ring_contains(ring: &[Point], p: Point) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };
    let mut inside = false;
    let mut prev = last;
    for &cur in ring {
        if (cur.y > p.y) != (prev.y > p.y) {
            let x = prev.x + (p.y - prev.y) * (cur.x - prev.x) / (cur.y - prev.y);
            if p.x < x {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}
