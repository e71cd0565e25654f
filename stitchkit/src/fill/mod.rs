//! Tatami fill for closed shapes.
//!
//! Axis-aligned rectangles filled along their own axes take a fast path
//! that lays rows directly. Everything else goes through scan-line clipping
//! followed by region-based travel ordering (see [`crate::order`]).

mod rect;
mod scanline;

pub use rect::fill_rectangle;
pub use scanline::{fill_polygon, scan_segments};

use std::f64::consts::FRAC_PI_2;

use crate::geometry::{Bounds, Point, dedup_points, is_axis_aligned_rectangle, signed_area};
use crate::pattern::Stitch;
use crate::rng::Rng;
use crate::settings::FillSettings;

/// Fill a closed polygon with rows of running stitch.
///
/// Degenerate shapes (fewer than three distinct points, zero area) produce
/// no stitches.
pub fn fill(polygon: &[Point], settings: &FillSettings, rng: &mut Rng) -> Vec<Stitch> {
    let ring = dedup_points(polygon);
    if ring.len() < 3 || signed_area(&ring).abs() < 1e-12 {
        return Vec::new();
    }

    if is_axis_aligned_rectangle(&ring) && is_quarter_turn(settings.angle) {
        if let Some(bounds) = Bounds::from_points(&ring) {
            return fill_rectangle(&bounds, settings, rng);
        }
    }
    fill_polygon(&ring, settings, rng)
}

/// Whether `angle` is a multiple of π/2, so a rectangle stays axis-aligned
/// in fill space.
fn is_quarter_turn(angle: f64) -> bool {
    let turns = angle / FRAC_PI_2;
    (turns - turns.round()).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }

    #[test]
    fn degenerate_polygons_are_empty() {
        let s = FillSettings::default();
        let mut rng = Rng::new(0);
        assert!(fill(&[], &s, &mut rng).is_empty());
        assert!(fill(&[Point::new(0.0, 0.0), Point::new(5.0, 5.0)], &s, &mut rng).is_empty());
        let flat = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        assert!(fill(&flat, &s, &mut rng).is_empty());
    }

    #[test]
    fn rectangle_at_right_angle_uses_fast_path() {
        let s = FillSettings::default()
            .with_spacing(5.0)
            .with_angle(FRAC_PI_2);
        let stitches = fill(&rect(0.0, 0.0, 50.0, 30.0), &s, &mut Rng::new(0));
        // Rows run vertically: ceil(50 / 5) + 1 distinct x values.
        let mut xs: Vec<i64> = stitches.iter().map(|st| st.x.round() as i64).collect();
        xs.sort();
        xs.dedup();
        assert_eq!(xs.len(), 11);
    }

    #[test]
    fn rotated_rectangle_stays_inside() {
        let s = FillSettings::default().with_spacing(1.0).with_angle(0.4);
        let stitches = fill(&rect(0.0, 0.0, 20.0, 10.0), &s, &mut Rng::new(0));
        assert!(!stitches.is_empty());
        for st in stitches.iter().filter(|st| st.command.is_none()) {
            assert!(st.x >= -1.0 && st.x <= 21.0 && st.y >= -1.0 && st.y <= 11.0);
        }
    }
}
