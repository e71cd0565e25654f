//! Zigzag (satin-like) stroke.

use crate::geometry::Point;
use crate::settings::StitchSettings;

/// Zigzag across `stroke_weight` along every segment of `path`.
///
/// Each segment gets `max(2, floor(d / stitch_length))` steps, bumped to an
/// odd count so the last point lands on the opposite side from the first.
pub fn generate_zigzag(path: &[Point], settings: &StitchSettings) -> Vec<Point> {
    let Some(&start) = path.first() else {
        return Vec::new();
    };

    let half_width = settings.stroke_weight / 2.0;
    let mut out = Vec::new();

    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let d = a.distance(b);
        // Zero-length segment has no direction to oscillate across.
        let Some(dir) = (b - a).normalized() else {
            continue;
        };
        let normal = dir.perpendicular() * half_width;

        let mut zigzags = ((d / settings.stitch_length).floor() as usize).max(2);
        if zigzags % 2 == 0 {
            zigzags += 1;
        }

        for i in 0..=zigzags {
            let t = i as f64 / zigzags as f64;
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            out.push(a.lerp(b, t) + normal * side);
        }
    }

    if out.is_empty() {
        out.push(start);
    }
    out
}
