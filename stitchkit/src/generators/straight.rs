//! Running stitch.

use crate::geometry::{EPSILON, Point};
use crate::rng::Rng;
use crate::settings::StitchSettings;

/// Slack when deciding whether a step has reached the segment end.
const END_TOLERANCE: f64 = 1e-6;

/// Running stitch along every segment of `path`.
///
/// The path's first point is always emitted. Zero-length segments are
/// skipped; a path with nothing but zero-length segments yields its start.
pub fn generate_straight(path: &[Point], settings: &StitchSettings, rng: &mut Rng) -> Vec<Point> {
    let Some(&start) = path.first() else {
        return Vec::new();
    };

    let mut out = vec![start];
    for w in path.windows(2) {
        straight_segment(w[0], w[1], settings, rng, &mut out);
    }
    out
}

/// Append the stitches of one segment, excluding its start point.
///
/// Segments shorter than `min_stitch_length` get a single stitch at the end.
/// Longer ones get `floor(d / stitch_length)` interior steps, each step
/// length jittered by `resample_noise * stitch_length`, and the exact end
/// when the leftover is at least `min_stitch_length` or nothing was placed.
pub fn straight_segment(
    a: Point,
    b: Point,
    settings: &StitchSettings,
    rng: &mut Rng,
    out: &mut Vec<Point>,
) {
    let d = a.distance(b);
    if d < EPSILON {
        return;
    }
    if d < settings.min_stitch_length {
        out.push(b);
        return;
    }

    let steps = (d / settings.stitch_length).floor() as usize;
    let noise = settings.resample_noise * settings.stitch_length;

    let mut travelled = 0.0;
    let mut last_placed = 0.0;
    let mut placed = 0usize;

    for _ in 0..steps {
        // Keep jittered steps moving forward.
        let step = (settings.stitch_length + rng.jitter(noise)).max(EPSILON);
        travelled += step;
        if travelled >= d - END_TOLERANCE {
            break;
        }
        out.push(a.lerp(b, travelled / d));
        last_placed = travelled;
        placed += 1;
    }

    let remainder = d - last_placed;
    if remainder >= settings.min_stitch_length - END_TOLERANCE || placed == 0 {
        out.push(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(len: f64, min: f64) -> StitchSettings {
        StitchSettings::default()
            .with_stitch_length(len)
            .with_min_stitch_length(min)
    }

    #[test]
    fn hundred_mm_at_three() {
        let path = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));

        assert_eq!(pts.len(), 35);
        for (i, p) in pts.iter().take(34).enumerate() {
            assert!((p.x - 3.0 * i as f64).abs() < 1e-9, "stitch {i} at {}", p.x);
        }
        assert_eq!(pts[34], Point::new(100.0, 0.0));
    }

    #[test]
    fn exact_multiple_ends_on_endpoint_once() {
        let path = vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0)];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 4);
        assert!((xs[1] - 3.0).abs() < 1e-9);
        assert!((xs[2] - 6.0).abs() < 1e-9);
        assert_eq!(xs[3], 9.0);
    }

    #[test]
    fn short_remainder_drops_endpoint() {
        let path = vec![Point::new(0.0, 0.0), Point::new(7.5, 0.0)];
        let pts = generate_straight(&path, &settings(3.0, 2.0), &mut Rng::new(0));
        // 0, 3, 6 and the 1.5mm remainder is below the minimum.
        assert_eq!(pts.len(), 3);
        assert!((pts[2].x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn segment_shorter_than_min_emits_endpoint() {
        let path = vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0)];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));
        assert_eq!(pts, vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0)]);
    }

    #[test]
    fn segment_shorter_than_stitch_emits_endpoint() {
        let path = vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1], Point::new(2.0, 0.0));
    }

    #[test]
    fn zero_length_segments_skipped() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
        ];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));
        assert_eq!(pts.len(), 3);
    }

    #[test]
    fn noise_is_seeded() {
        let path = vec![Point::new(0.0, 0.0), Point::new(50.0, 20.0)];
        let s = settings(3.0, 1.0).with_resample_noise(0.3);

        let a = generate_straight(&path, &s, &mut Rng::new(11));
        let b = generate_straight(&path, &s, &mut Rng::new(11));
        let plain = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(11));

        assert_eq!(a, b);
        assert_ne!(a, plain);
        assert_eq!(a[0], path[0]);
    }

    #[test]
    fn multi_segment_path_visits_corners() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let pts = generate_straight(&path, &settings(3.0, 1.0), &mut Rng::new(0));
        assert!(pts.contains(&Point::new(10.0, 0.0)));
        assert_eq!(pts.last(), Some(&Point::new(10.0, 10.0)));
    }
}
