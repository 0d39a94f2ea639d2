//! Centerline-to-capsule stroke expansion (made by FontLab https://www.fontlab.com/)

use std::f64::consts::PI;

use crate::geometry::{signed_area, Point, Polyline};

/// Straight segments per semicircular cap when no explicit count is given.
pub const DEFAULT_CAP_SEGMENTS: usize = 8;

/// Segments shorter than this are treated as zero-length.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// A stroked segment: rectangle plus two semicircular caps, counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Capsule {
    pub points: Vec<Point>,
}

impl Capsule {
    pub fn area(&self) -> f64 {
        signed_area(&self.points)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StrokeExpander {
    half_width: f64,
    cap_segments: usize,
}

impl StrokeExpander {
    pub fn new(stroke_width: f64, cap_segments: usize) -> Self {
        Self {
            half_width: stroke_width / 2.0,
            cap_segments: cap_segments.max(2),
        }
    }

    /// One capsule per non-degenerate segment, closing segment included.
    pub fn expand(&self, line: &Polyline) -> Vec<Capsule> {
        line.segments()
            .filter_map(|(p1, p2)| self.capsule(p1, p2))
            .collect()
    }

    pub fn expand_all<'a, I>(&self, lines: I) -> Vec<Capsule>
    where
        I: IntoIterator<Item = &'a Polyline>,
    {
        lines.into_iter().flat_map(|line| self.expand(line)).collect()
    }

    /// Capsule around `p1 → p2`, or `None` for a zero-length segment.
    pub fn capsule(&self, p1: Point, p2: Point) -> Option<Capsule> {
        let len = p1.distance(p2);
        if len < DEGENERATE_LENGTH {
            return None;
        }

        let d = Point::new((p2.x - p1.x) / len, (p2.y - p1.y) / len);
        let n = Point::new(-d.y, d.x);
        let r = self.half_width;
        let steps = self.cap_segments;

        // Angles are measured from `d` towards `n`, so increasing angle turns counter-clockwise.
        let around = |center: Point, angle: f64| {
            let (sin, cos) = angle.sin_cos();
            Point::new(
                center.x + r * (cos * d.x + sin * n.x),
                center.y + r * (cos * d.y + sin * n.y),
            )
        };

        let mut points = Vec::with_capacity(2 * (steps + 1));
        for k in 0..=steps {
            let angle = -PI / 2.0 + PI * k as f64 / steps as f64;
            points.push(around(p2, angle));
        }
        for k in 0..=steps {
            let angle = PI / 2.0 + PI * k as f64 / steps as f64;
            points.push(around(p1, angle));
        }

        Some(Capsule { points })
    }
}
