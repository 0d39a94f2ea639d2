use proptest::prelude::*;

use strokefont_core::geometry::{
    ring_contains, signed_area, BoundingBox, Outline, Point, Polyline,
};
use strokefont_core::path::PathParser;
use strokefont_core::stroke::{Capsule, StrokeExpander, DEFAULT_CAP_SEGMENTS};
use strokefont_core::union::unify;

fn segment() -> impl Strategy<Value = Polyline> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_filter_map(
        "segment too short",
        |(x1, y1, x2, y2)| {
            let (a, b) = (Point::new(x1, y1), Point::new(x2, y2));
            (a.distance(b) > 0.05).then(|| Polyline::open(vec![a, b]))
        },
    )
}

/// Points on a 0.1 grid, so strokes share endpoints, retrace each other and close counters.
fn grid_polyline() -> impl Strategy<Value = Polyline> {
    let point = (1u8..10, 1u8..10)
        .prop_map(|(x, y)| Point::new(f64::from(x) / 10.0, f64::from(y) / 10.0));
    (prop::collection::vec(point, 2..8), any::<bool>())
        .prop_map(|(points, closed)| Polyline { points, closed })
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Grid samples where the outline disagrees with "inside some capsule".
/// Samples within a hair of a capsule edge are skipped.
fn coverage_mismatches(outline: &Outline, caps: &[Capsule], n: usize) -> usize {
    let Some(bbox) = BoundingBox::from_points(caps.iter().flat_map(|c| c.points.iter())) else {
        return 0;
    };
    let mut mismatches = 0;
    for i in 0..n {
        for j in 0..n {
            let p = Point::new(
                bbox.min_x + bbox.width() * (i as f64 + 0.37) / n as f64,
                bbox.min_y + bbox.height() * (j as f64 + 0.61) / n as f64,
            );
            let near_edge = caps.iter().any(|c| {
                let ring = &c.points;
                (0..ring.len())
                    .any(|k| distance_to_segment(p, ring[k], ring[(k + 1) % ring.len()]) < 1e-7)
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

proptest! {
    #[test]
    fn parser_survives_arbitrary_text(data in "\\PC{0,64}") {
        let parsed = PathParser::default().parse(&data);
        prop_assert!(parsed.polylines.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn parser_survives_command_soup(data in "[MLZQCmlzqc0-9 .,eE+-]{0,48}") {
        let parsed = PathParser::default().parse(&data);
        for line in &parsed.polylines {
            prop_assert!(line.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        }
    }

    #[test]
    fn capsules_wind_counter_clockwise(line in segment(), width in 0.01f64..0.3) {
        let caps = StrokeExpander::new(width, DEFAULT_CAP_SEGMENTS).expand(&line);
        prop_assert_eq!(caps.len(), 1);
        prop_assert!(caps[0].area() > 0.0);
    }

    #[test]
    fn union_area_is_bounded_by_its_capsules(lines in prop::collection::vec(segment(), 1..4)) {
        let caps = StrokeExpander::new(0.1, DEFAULT_CAP_SEGMENTS).expand_all(&lines);
        let unified = unify(&caps);
        prop_assert_eq!(&unified.fallback, &None);

        let largest = caps.iter().map(Capsule::area).fold(0.0, f64::max);
        let sum: f64 = caps.iter().map(Capsule::area).sum();
        let area = unified.outline.area();
        prop_assert!(area >= largest - 1e-6, "area {} < largest {}", area, largest);
        prop_assert!(area <= sum + 1e-6, "area {} > sum {}", area, sum);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn grid_glyphs_unify_to_exactly_their_capsules(
        lines in prop::collection::vec(grid_polyline(), 1..3)
    ) {
        let caps = StrokeExpander::new(0.1, DEFAULT_CAP_SEGMENTS).expand_all(&lines);
        let unified = unify(&caps);
        prop_assert_eq!(&unified.fallback, &None);

        let mismatches = coverage_mismatches(&unified.outline, &caps, 48);
        prop_assert_eq!(mismatches, 0, "outline disagrees with capsules at {} samples", mismatches);

        let largest = caps.iter().map(Capsule::area).fold(0.0, f64::max);
        let sum: f64 = caps.iter().map(Capsule::area).sum();
        let area = unified.outline.area();
        prop_assert!(area >= largest - 1e-6, "area {} < largest {}", area, largest);
        prop_assert!(area <= sum + 1e-6, "area {} > sum {}", area, sum);

        for face in &unified.outline.faces {
            prop_assert!(face.outer.len() >= 3);
            prop_assert!(signed_area(&face.outer) > 0.0);
            for hole in &face.holes {
                prop_assert!(signed_area(hole) < 0.0);
            }
        }
    }
}
