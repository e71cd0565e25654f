//! Core geometry types for stitchkit.
//!
//! Everything here is in millimeters. Conversion to machine units happens
//! only inside the encoders.
//!
//! ## Rust Lesson #3: Operator Overloading
//!
//! In JS you'd write `{ x: a.x + b.x, y: a.y + b.y }` by hand every time.
//! Implementing `std::ops::Add` for `Point` lets us write `a + b` instead,
//! and because `Point` is `Copy` the operands are simply copied.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing lengths and coordinates.
pub const EPSILON: f64 = 1e-9;

/// Miter length limit for polygon expansion, as a multiple of the distance.
const MITER_LIMIT: f64 = 4.0;

/// A 2D point in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A line segment defined by two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Length of the point treated as a vector from the origin.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[inline]
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len < EPSILON {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    /// The vector rotated a quarter turn: `(-y, x)`.
    #[inline]
    pub fn perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    #[inline]
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Both coordinates are finite (no NaN or infinity).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotate around `center` by `angle` radians.
    #[inline]
    pub fn rotate_around(&self, center: Point, angle: f64) -> Point {
        let (sin_a, cos_a) = angle.sin_cos();
        let d = *self - center;
        Point::new(
            center.x + d.x * cos_a - d.y * sin_a,
            center.y + d.x * sin_a + d.y * cos_a,
        )
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        self.start().lerp(self.end(), 0.5)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// The same segment walked in the opposite direction.
    #[inline]
    pub fn reversed(&self) -> Line {
        Line::new(self.x2, self.y2, self.x1, self.y1)
    }
}

impl Bounds {
    /// Bounding box of the finite points in `points`, or `None` if there are none.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut iter = points.iter().filter(|p| p.is_finite());
        let first = iter.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.include(*p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    #[inline]
    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        let (w, h) = (self.width(), self.height());
        (w * w + h * h).sqrt()
    }

    /// A copy grown by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

// ============================================================================
// POLYGON UTILITIES
// ============================================================================

/// Signed area using the shoelace formula.
///
/// Positive for counter-clockwise winding (Y up), negative for clockwise.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

#[inline]
pub fn is_clockwise(points: &[Point]) -> bool {
    signed_area(points) < 0.0
}

/// Total length of an open polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Drop consecutive duplicate points (within [`EPSILON`]).
pub fn dedup_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|last| last.distance(p) > EPSILON) {
            out.push(p);
        }
    }
    out
}

/// Whether the points form an axis-aligned rectangle (4 corners, optionally
/// closed with a repeated first point).
pub fn is_axis_aligned_rectangle(points: &[Point]) -> bool {
    let mut corners = dedup_points(points);
    if corners.len() == 5 && corners[0].distance(corners[4]) <= EPSILON {
        corners.pop();
    }
    if corners.len() != 4 {
        return false;
    }

    let Some(bounds) = Bounds::from_points(&corners) else {
        return false;
    };
    if bounds.width() <= EPSILON || bounds.height() <= EPSILON {
        return false;
    }

    // Every edge must be horizontal or vertical, and every corner on the box.
    (0..4).all(|i| {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let on_box = (a.x - bounds.min_x).abs() <= EPSILON || (a.x - bounds.max_x).abs() <= EPSILON;
        let on_box_y = (a.y - bounds.min_y).abs() <= EPSILON || (a.y - bounds.max_y).abs() <= EPSILON;
        let axis_edge = (a.x - b.x).abs() <= EPSILON || (a.y - b.y).abs() <= EPSILON;
        on_box && on_box_y && axis_edge
    })
}

/// Convex hull using Andrew's monotone chain.
///
/// Returns the hull counter-clockwise (Y up) without repeating the first
/// point. Collinear points on the hull are dropped. Non-finite points are
/// ignored. Fewer than three distinct points are returned as-is.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.iter().copied().filter(Point::is_finite).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.distance(*b) <= EPSILON);

    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    // The last point of each half is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Offset a closed polygon outward by `distance` (inward when negative).
///
/// Each vertex moves along the miter of its two adjacent edge normals so
/// edges stay parallel to the originals. Very sharp corners are clamped to
/// `MITER_LIMIT * distance`. Works for either winding.
pub fn expand_polygon(points: &[Point], distance: f64) -> Vec<Point> {
    let mut ring = dedup_points(points);
    if ring.len() >= 2 && ring[0].distance(ring[ring.len() - 1]) <= EPSILON {
        ring.pop();
    }
    let n = ring.len();
    if n < 3 || distance.abs() < EPSILON {
        return ring;
    }

    // Outward normal of edge a->b depends on winding.
    let outward = if is_clockwise(&ring) { 1.0 } else { -1.0 };
    let edge_normal = |a: Point, b: Point| -> Point {
        (b - a)
            .normalized()
            .map(|d| d.perpendicular() * outward)
            .unwrap_or_default()
    };

    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];

            let n1 = edge_normal(prev, curr);
            let n2 = edge_normal(curr, next);

            match (n1 + n2).normalized() {
                Some(miter) => {
                    let cos_half = miter.dot(n1).max(1.0 / MITER_LIMIT);
                    curr + miter * (distance / cos_half)
                }
                // Edges fold back on themselves; push along one normal.
                None => curr + n1 * distance,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
