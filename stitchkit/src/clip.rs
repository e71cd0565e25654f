//! Scan-line clipping against arbitrary polygons.
//!
//! The fill engine casts one long segment per row across the shape and
//! keeps the pieces that fall inside. Everything here works on `&[Point]`
//! rings, open or closed.

use crate::geometry::{EPSILON, Line, Point};

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside.
#[inline]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

// ============================================================================
// SEGMENT INTERSECTION
// ============================================================================

/// Result of a segment-segment intersection test.
///
/// `t` is the parameter along the first segment (0 at its start, 1 at its end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    None,
    Point { at: Point, t: f64 },
}

/// Intersect two segments. Parallel and coincident segments never intersect.
#[inline]
pub fn segment_intersection(a: &Line, b: &Line) -> Intersection {
    let d1 = a.end() - a.start();
    let d2 = b.end() - b.start();
    let denom = d2.y * d1.x - d2.x * d1.y;

    if denom.abs() < 1e-12 {
        return Intersection::None;
    }

    let offset = a.start() - b.start();
    let ua = (d2.x * offset.y - d2.y * offset.x) / denom;
    let ub = (d1.x * offset.y - d1.y * offset.x) / denom;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Intersection::Point {
            at: a.start() + d1 * ua,
            t: ua,
        }
    } else {
        Intersection::None
    }
}

/// All crossings of `scan` with the polygon's edges, sorted by distance from
/// the scan segment's start.
///
/// A scan line passing exactly through a vertex touches two edges there;
/// such duplicate hits are collapsed into one.
pub fn scan_segment_intersections(scan: &Line, polygon: &[Point]) -> Vec<Point> {
    let n = polygon.len();
    if n < 2 {
        return Vec::new();
    }

    let mut hits: Vec<(f64, Point)> = Vec::with_capacity(n / 2 + 2);

    for i in 0..n {
        let edge = Line::from_points(polygon[i], polygon[(i + 1) % n]);
        if let Intersection::Point { at, t } = segment_intersection(scan, &edge) {
            hits.push((t, at));
        }
    }

    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.dedup_by(|a, b| a.1.distance(b.1) <= EPSILON);

    hits.into_iter().map(|(_, p)| p).collect()
}

/// Clip a scan segment to the polygon interior.
///
/// Consecutive intersection pairs become candidate spans; a span is kept
/// only when its midpoint is inside, which handles concave shapes and
/// holes-by-winding without tracking in/out parity explicitly.
pub fn clip_scan_line(scan: &Line, polygon: &[Point]) -> Vec<Line> {
    let hits = scan_segment_intersections(scan, polygon);
    if hits.len() < 2 {
        return Vec::new();
    }

    hits.windows(2)
        .map(|w| Line::from_points(w[0], w[1]))
        .filter(|span| span.length() > EPSILON && point_in_polygon(span.midpoint(), polygon))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    /// An L covering x 0..10, y 0..10 minus the notch x 5..10, y 5..10.
    fn l_shape() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn point_in_polygon_basic() {
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square()));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square()));
        assert!(!point_in_polygon(Point::new(7.5, 7.5), &l_shape()));
        assert!(point_in_polygon(Point::new(2.5, 7.5), &l_shape()));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(!point_in_polygon(Point::new(0.5, 0.5), &line));
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = Line::new(0.0, 0.0, 10.0, 10.0);
        let b = Line::new(0.0, 10.0, 10.0, 0.0);
        match segment_intersection(&a, &b) {
            Intersection::Point { at, t } => {
                assert!((at.x - 5.0).abs() < 1e-9);
                assert!((at.y - 5.0).abs() < 1e-9);
                assert!((t - 0.5).abs() < 1e-9);
            }
            Intersection::None => panic!("expected an intersection"),
        }
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Line::new(0.0, 0.0, 10.0, 0.0);
        let b = Line::new(0.0, 1.0, 10.0, 1.0);
        assert_eq!(segment_intersection(&a, &b), Intersection::None);
    }

    #[test]
    fn hits_sorted_from_scan_start() {
        let scan = Line::new(20.0, 5.0, -20.0, 5.0);
        let hits = scan_segment_intersections(&scan, &square());
        assert_eq!(hits.len(), 2);
        assert!((hits[0].x - 10.0).abs() < 1e-9);
        assert!(hits[1].x.abs() < 1e-9);
    }

    #[test]
    fn clip_through_convex_shape() {
        let spans = clip_scan_line(&Line::new(-20.0, 5.0, 20.0, 5.0), &square());
        assert_eq!(spans.len(), 1);
        assert!((spans[0].length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn clip_skips_concave_notch() {
        // The row at y = 7.5 passes through the arm and the notch.
        let spans = clip_scan_line(&Line::new(-20.0, 7.5, 20.0, 7.5), &l_shape());
        assert_eq!(spans.len(), 1);
        assert!(spans[0].x1.max(spans[0].x2) <= 5.0 + 1e-9);
    }

    #[test]
    fn clip_u_shape_yields_two_spans() {
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 20.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
        ];
        let spans = clip_scan_line(&Line::new(-5.0, 15.0, 35.0, 15.0), &u);
        assert_eq!(spans.len(), 2);
    }
}
