//! Scan-line fill for arbitrary polygons.

use tracing::debug;

use crate::clip::clip_scan_line;
use crate::geometry::{Bounds, Line, Point};
use crate::order::order_segments;
use crate::pattern::Stitch;
use crate::rng::Rng;
use crate::settings::FillSettings;

/// Clip parallel scan lines against the polygon.
///
/// Scan lines sit at offsets `-diagonal/2 ..= diagonal/2` (step `spacing`)
/// from the bounding-box center, perpendicular to the fill direction. Each
/// line is long enough to cross the whole shape at any angle. Odd rows run
/// backwards so neighbouring rows already alternate direction.
pub fn scan_segments(polygon: &[Point], settings: &FillSettings) -> Vec<Line> {
    let Some(bounds) = Bounds::from_points(polygon) else {
        return Vec::new();
    };

    let center = bounds.center();
    let half_diag = bounds.diagonal() / 2.0;
    let (sin_a, cos_a) = settings.angle.sin_cos();
    let dir = Point::new(cos_a, sin_a);
    let normal = dir.perpendicular();
    let reach = half_diag + settings.spacing;

    let mut segments = Vec::new();
    let mut row = 0usize;
    let mut d = -half_diag;

    while d <= half_diag + 1e-9 {
        let mid = center + normal * d;
        let scan = Line::from_points(mid - dir * reach, mid + dir * reach);

        let mut spans = clip_scan_line(&scan, polygon);
        if row % 2 == 1 {
            spans.reverse();
            for span in &mut spans {
                *span = span.reversed();
            }
        }
        segments.extend(spans);

        row += 1;
        d = -half_diag + row as f64 * settings.spacing;
    }

    segments
}

/// Scan-fill a polygon and order its rows for minimal travel.
pub fn fill_polygon(polygon: &[Point], settings: &FillSettings, rng: &mut Rng) -> Vec<Stitch> {
    let segments = scan_segments(polygon, settings);
    debug!(segments = segments.len(), "scan fill clipped rows");
    order_segments(&segments, settings, rng)
}
