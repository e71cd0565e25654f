//! Sashiko: dashes of parallel lines separated by plain running stitch.

use crate::geometry::{EPSILON, Point, polyline_length};
use crate::rng::Rng;
use crate::settings::StitchSettings;

use super::multiline::generate_multiline;
use super::straight::generate_straight;

/// The part of `path` between arc lengths `from` and `to`.
///
/// Both ends are interpolated; the original vertices in between are kept.
pub fn sub_path(path: &[Point], from: f64, to: f64) -> Vec<Point> {
    let mut out = Vec::new();
    if path.is_empty() || to <= from {
        return out;
    }

    let mut walked = 0.0;
    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        let seg_start = walked;
        let seg_end = walked + len;
        walked = seg_end;

        if len < EPSILON || seg_end < from || seg_start > to {
            continue;
        }

        if out.is_empty() {
            out.push(a.lerp(b, ((from - seg_start) / len).clamp(0.0, 1.0)));
        }
        if seg_end < to {
            out.push(b);
        } else {
            out.push(a.lerp(b, ((to - seg_start) / len).clamp(0.0, 1.0)));
            break;
        }
    }
    out
}

/// Alternate `stitch_length` pieces of multi-line and straight stitching.
///
/// Even pieces (starting with the first) are multi-line dashes, odd pieces
/// are a single running stitch.
pub fn generate_sashiko(path: &[Point], settings: &StitchSettings, rng: &mut Rng) -> Vec<Point> {
    let Some(&start) = path.first() else {
        return Vec::new();
    };

    let total = polyline_length(path);
    if total < EPSILON {
        return vec![start];
    }

    let piece_len = settings.stitch_length;
    let pieces = (total / piece_len).ceil() as usize;
    let mut out: Vec<Point> = Vec::new();

    for i in 0..pieces {
        let from = i as f64 * piece_len;
        let to = (from + piece_len).min(total);
        let piece = sub_path(path, from, to);
        if piece.len() < 2 {
            continue;
        }

        let stitched = if i % 2 == 0 {
            generate_multiline(&piece, settings, rng)
        } else {
            generate_straight(&piece, settings, rng)
        };

        for p in stitched {
            // Pieces share their boundary point.
            if out.last().is_none_or(|last| last.distance(p) > EPSILON) {
                out.push(p);
            }
        }
    }

    if out.is_empty() {
        out.push(start);
    }
    out
}
