//! Stroke generators.
//!
//! Each generator turns a path (two or more points, in mm) into needle
//! positions. They are pure apart from the injected [`Rng`], which only
//! matters when `resample_noise > 0`.

mod multiline;
mod sashiko;
mod straight;
mod zigzag;

pub use multiline::{generate_multiline, offset_path};
pub use sashiko::{generate_sashiko, sub_path};
pub use straight::{generate_straight, straight_segment};
pub use zigzag::generate_zigzag;

use crate::geometry::Point;
use crate::pattern::Stitch;
use crate::rng::Rng;
use crate::settings::{StitchSettings, StrokeMode};

/// Stitch a path with the mode selected by `settings`.
///
/// Zero stroke weight always stitches straight. A path whose segments all
/// have zero length yields just its start point; an empty path yields nothing.
pub fn generate(path: &[Point], settings: &StitchSettings, rng: &mut Rng) -> Vec<Stitch> {
    let points = match settings.effective_mode() {
        StrokeMode::Straight => generate_straight(path, settings, rng),
        StrokeMode::Zigzag => generate_zigzag(path, settings),
        StrokeMode::Lines => generate_multiline(path, settings, rng),
        StrokeMode::Sashiko => generate_sashiko(path, settings, rng),
    };
    points.into_iter().map(Stitch::at).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)]
    }

    #[test]
    fn every_mode_produces_stitches() {
        for mode in StrokeMode::all() {
            let settings = StitchSettings::default()
                .with_stroke_mode(*mode)
                .with_stroke_weight(2.0);
            let stitches = generate(&segment(), &settings, &mut Rng::new(1));
            assert!(stitches.len() >= 2, "{} produced {}", mode.name(), stitches.len());
            assert!(stitches.iter().all(|s| s.command.is_none()));
        }
    }

    #[test]
    fn zero_weight_falls_back_to_straight() {
        let settings = StitchSettings::default().with_stroke_mode(StrokeMode::Zigzag);
        let stitches = generate(&segment(), &settings, &mut Rng::new(1));
        assert!(stitches.iter().all(|s| s.y == 0.0));
    }

    #[test]
    fn degenerate_path_returns_start() {
        let path = vec![Point::new(4.0, 4.0), Point::new(4.0, 4.0)];
        for mode in StrokeMode::all() {
            let settings = StitchSettings::default()
                .with_stroke_mode(*mode)
                .with_stroke_weight(2.0);
            let stitches = generate(&path, &settings, &mut Rng::new(1));
            assert_eq!(stitches, vec![Stitch::new(4.0, 4.0)], "{}", mode.name());
        }
    }

    #[test]
    fn empty_path_is_empty() {
        assert!(generate(&[], &StitchSettings::default(), &mut Rng::new(1)).is_empty());
    }
}
