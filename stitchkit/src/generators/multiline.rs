//! Parallel running stitches filling a stroke's width.

use crate::geometry::{Point, dedup_points};
use crate::rng::Rng;
use crate::settings::StitchSettings;

use super::straight::generate_straight;

/// Offset an open path sideways by `distance` (positive to the left).
///
/// End vertices use their segment's normal. Interior vertices use the
/// re-normalized average of both adjacent normals so corners stay joined.
/// Consecutive duplicate points are removed first.
pub fn offset_path(path: &[Point], distance: f64) -> Vec<Point> {
    let pts = dedup_points(path);
    if pts.len() < 2 {
        return pts;
    }

    let normals: Vec<Point> = pts
        .windows(2)
        .map(|w| {
            (w[1] - w[0])
                .normalized()
                .map(|d| d.perpendicular())
                .unwrap_or_default()
        })
        .collect();

    let last = pts.len() - 1;
    pts.iter()
        .enumerate()
        .map(|(i, &p)| {
            let normal = if i == 0 {
                normals[0]
            } else if i == last {
                normals[last - 1]
            } else {
                // A path folding back on itself averages to zero.
                (normals[i - 1] + normals[i])
                    .normalized()
                    .unwrap_or(normals[i - 1])
            };
            p + normal * distance
        })
        .collect()
}

/// Stitch `max(2, floor(stroke_weight / stitch_width))` parallel lines
/// evenly spread across the stroke, alternating direction line to line.
pub fn generate_multiline(path: &[Point], settings: &StitchSettings, rng: &mut Rng) -> Vec<Point> {
    let Some(&start) = path.first() else {
        return Vec::new();
    };
    if dedup_points(path).len() < 2 {
        return vec![start];
    }

    let num_lines = ((settings.stroke_weight / settings.stitch_width).floor() as usize).max(2);
    let half = settings.stroke_weight / 2.0;

    let mut out = Vec::new();
    for line in 0..num_lines {
        let offset = -half + settings.stroke_weight * line as f64 / (num_lines - 1) as f64;
        let mut lane = offset_path(path, offset);
        if line % 2 == 1 {
            lane.reverse();
        }
        out.extend(generate_straight(&lane, settings, rng));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(weight: f64, width: f64) -> StitchSettings {
        StitchSettings::default()
            .with_stroke_weight(weight)
            .with_stitch_width(width)
    }

    #[test]
    fn offset_straight_line() {
        let path = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let left = offset_path(&path, 1.0);
        assert_eq!(left, vec![Point::new(0.0, 1.0), Point::new(10.0, 1.0)]);
    }

    #[test]
    fn offset_corner_uses_averaged_normal() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let shifted = offset_path(&path, 1.0);
        let corner = shifted[1];
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((corner.x - (10.0 - h)).abs() < 1e-9);
        assert!((corner.y - h).abs() < 1e-9);
    }

    #[test]
    fn line_count_from_weight() {
        let path = vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0)];
        // 2.0 / 0.5 = 4 lanes at y = -1, -1/3, 1/3, 1.
        let pts = generate_multiline(&path, &settings(2.0, 0.5), &mut Rng::new(0));
        let mut lanes: Vec<i64> = pts.iter().map(|p| (p.y * 1000.0).round() as i64).collect();
        lanes.dedup();
        assert_eq!(lanes, vec![-1000, -333, 333, 1000]);
    }

    #[test]
    fn at_least_two_lines() {
        let path = vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0)];
        let pts = generate_multiline(&path, &settings(0.3, 0.5), &mut Rng::new(0));
        assert!(pts.iter().any(|p| p.y > 0.0));
        assert!(pts.iter().any(|p| p.y < 0.0));
    }

    #[test]
    fn lanes_alternate_direction() {
        let path = vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0)];
        let pts = generate_multiline(&path, &settings(1.0, 0.5), &mut Rng::new(0));
        // Lane 0 runs forward and ends at x = 6; lane 1 starts there.
        let first_lane_end = pts.iter().position(|p| p.y > 0.0).unwrap() - 1;
        assert!((pts[first_lane_end].x - 6.0).abs() < 1e-9);
        assert!((pts[first_lane_end + 1].x - 6.0).abs() < 1e-9);
        assert!(pts.last().unwrap().x.abs() < 1e-9);
    }
}
