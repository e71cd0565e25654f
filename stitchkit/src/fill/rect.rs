//! Rectangle fast path.

use crate::generators::straight_segment;
use crate::geometry::{Bounds, Point};
use crate::pattern::Stitch;
use crate::rng::Rng;
use crate::settings::FillSettings;

/// Boustrophedon rows across a rectangle.
///
/// The corners are rotated into fill space (by `-angle` around the center),
/// rows are laid at `spacing` pitch from the bottom edge with the last row
/// clamped to the top edge, giving `ceil(height / spacing) + 1` rows. Rows
/// alternate direction and are rotated back before stitching.
pub fn fill_rectangle(bounds: &Bounds, settings: &FillSettings, rng: &mut Rng) -> Vec<Stitch> {
    let center = bounds.center();
    let corners = [
        Point::new(bounds.min_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.min_y),
        Point::new(bounds.max_x, bounds.max_y),
        Point::new(bounds.min_x, bounds.max_y),
    ];
    let rotated: Vec<Point> = corners
        .iter()
        .map(|c| c.rotate_around(center, -settings.angle))
        .collect();
    let Some(space) = Bounds::from_points(&rotated) else {
        return Vec::new();
    };

    // Guard against 6.0000000001 becoming 7.
    let num_rows = ((space.height() / settings.spacing) - 1e-9).ceil().max(0.0) as usize;
    let row_settings = settings.row_settings();
    let mut points: Vec<Point> = Vec::new();

    for row in 0..=num_rows {
        let y = (space.min_y + row as f64 * settings.spacing).min(space.max_y);
        let (x0, x1) = if row % 2 == 0 {
            (space.min_x, space.max_x)
        } else {
            (space.max_x, space.min_x)
        };
        let a = Point::new(x0, y).rotate_around(center, settings.angle);
        let b = Point::new(x1, y).rotate_around(center, settings.angle);

        points.push(a);
        straight_segment(a, b, &row_settings, rng, &mut points);
    }

    points.into_iter().map(Stitch::at).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(w: f64, h: f64) -> Bounds {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: w,
            max_y: h,
        }
    }

    /// Distinct row heights in stitch order.
    fn rows(stitches: &[Stitch]) -> Vec<f64> {
        let mut ys: Vec<f64> = Vec::new();
        for s in stitches {
            if ys.last().is_none_or(|y| (y - s.y).abs() > 1e-6) {
                ys.push(s.y);
            }
        }
        ys
    }

    #[test]
    fn fifty_by_thirty_at_five_has_seven_rows() {
        let s = FillSettings::default().with_spacing(5.0);
        let stitches = fill_rectangle(&bounds(50.0, 30.0), &s, &mut Rng::new(0));

        let ys = rows(&stitches);
        assert_eq!(ys.len(), 7);
        assert!((ys[0] - 0.0).abs() < 1e-9);
        assert!((ys[6] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn rows_alternate_start_corner() {
        let s = FillSettings::default().with_spacing(5.0);
        let stitches = fill_rectangle(&bounds(50.0, 30.0), &s, &mut Rng::new(0));

        let row_starts: Vec<&Stitch> = stitches
            .iter()
            .enumerate()
            .filter(|(i, st)| *i == 0 || (stitches[i - 1].y - st.y).abs() > 1e-6)
            .map(|(_, st)| st)
            .collect();
        assert_eq!(row_starts.len(), 7);
        for (i, st) in row_starts.iter().enumerate() {
            let expected = if i % 2 == 0 { 0.0 } else { 50.0 };
            assert!((st.x - expected).abs() < 1e-9, "row {i} starts at {}", st.x);
        }
    }

    #[test]
    fn last_row_clamped_to_top() {
        let s = FillSettings::default().with_spacing(4.0);
        let stitches = fill_rectangle(&bounds(10.0, 10.0), &s, &mut Rng::new(0));
        let ys = rows(&stitches);
        // 0, 4, 8, then clamped to 10.
        assert_eq!(ys.len(), 4);
        assert!((ys[3] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rows_end_on_far_edge() {
        let s = FillSettings::default().with_spacing(5.0);
        let stitches = fill_rectangle(&bounds(50.0, 30.0), &s, &mut Rng::new(0));
        let first_row: Vec<&Stitch> = stitches.iter().filter(|st| st.y.abs() < 1e-9).collect();
        assert_eq!(first_row.last().map(|st| st.x), Some(50.0));
    }
}
