//! Travel ordering for fill rows.
//!
//! Scan-fill produces many short row segments. Sewing them in scan order
//! would drag thread back and forth across concave gaps, so rows are first
//! grouped into connected regions and then chained greedily.
//!
//! ## Algorithms
//!
//! - **Region partition**: rows whose endpoints lie within the proximity
//!   threshold are adjacent; a flood fill over that adjacency yields regions.
//!   A grid hash keyed by endpoint cell keeps neighbour lookup near O(n).
//! - **Nearest neighbor**: inside a region, greedily take the row whose
//!   nearer endpoint is closest to the needle, reversing it if needed.
//!   Regions are visited in the same greedy way.

use std::collections::HashMap;

use tracing::debug;

use crate::generators::straight_segment;
use crate::geometry::{Line, Point};
use crate::pattern::Stitch;
use crate::rng::Rng;
use crate::settings::FillSettings;

/// Grid cell for a point, with cells `cell_size` wide.
#[inline]
fn point_to_cell(p: Point, cell_size: f64) -> (i64, i64) {
    ((p.x / cell_size).floor() as i64, (p.y / cell_size).floor() as i64)
}

/// Group segments into connected regions.
///
/// Two segments are adjacent when any endpoint of one lies within
/// `proximity` of any endpoint of the other. Each region lists segment
/// indices in ascending order; regions are ordered by their lowest index.
pub fn partition_regions(segments: &[Line], proximity: f64) -> Vec<Vec<usize>> {
    let n = segments.len();
    if n == 0 {
        return Vec::new();
    }
    let cell_size = proximity.max(1e-6);

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        for p in [seg.start(), seg.end()] {
            let cell = point_to_cell(p, cell_size);
            let bucket = grid.entry(cell).or_default();
            if bucket.last() != Some(&i) {
                bucket.push(i);
            }
        }
    }

    let mut region_of: Vec<Option<usize>> = vec![None; n];
    let mut regions: Vec<Vec<usize>> = Vec::new();

    for seed in 0..n {
        if region_of[seed].is_some() {
            continue;
        }
        let id = regions.len();
        region_of[seed] = Some(id);
        let mut members = vec![seed];
        let mut stack = vec![seed];

        while let Some(current) = stack.pop() {
            let seg = &segments[current];
            for p in [seg.start(), seg.end()] {
                let (cx, cy) = point_to_cell(p, cell_size);
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        let Some(candidates) = grid.get(&(cx + dx, cy + dy)) else {
                            continue;
                        };
                        for &other in candidates {
                            if region_of[other].is_some() {
                                continue;
                            }
                            let o = &segments[other];
                            let near = [o.start(), o.end()]
                                .iter()
                                .any(|q| q.distance(p) <= proximity);
                            if near {
                                region_of[other] = Some(id);
                                members.push(other);
                                stack.push(other);
                            }
                        }
                    }
                }
            }
        }

        members.sort_unstable();
        regions.push(members);
    }

    regions
}

/// Closest endpoint of any segment in `region` to `from`.
fn nearest_endpoint(segments: &[Line], region: &[usize], from: Point) -> f64 {
    region
        .iter()
        .flat_map(|&i| [segments[i].start(), segments[i].end()])
        .map(|p| p.distance(from))
        .fold(f64::INFINITY, f64::min)
}

/// Chain every region, starting with the one holding segment 0 and then
/// repeatedly moving to the unvisited region nearest the current exit.
fn order_regions(segments: &[Line], regions: &[Vec<usize>]) -> Vec<Vec<Line>> {
    let mut remaining: Vec<usize> = (0..regions.len()).collect();
    let mut ordered = Vec::with_capacity(regions.len());
    let mut cursor: Option<Point> = None;

    while !remaining.is_empty() {
        let pick = match cursor {
            // Region 0 always contains segment 0.
            None => 0,
            Some(at) => {
                let mut best = 0;
                let mut best_dist = f64::INFINITY;
                for (k, &r) in remaining.iter().enumerate() {
                    let d = nearest_endpoint(segments, &regions[r], at);
                    if d < best_dist {
                        best_dist = d;
                        best = k;
                    }
                }
                best
            }
        };
        let region = remaining.remove(pick);
        let chain = chain_region(segments, &regions[region], cursor);
        cursor = chain.last().map(Line::end);
        ordered.push(chain);
    }

    ordered
}

/// Greedy nearest-neighbor chain through one region's segments.
///
/// Without a starting position the first segment is taken as-is.
fn chain_region(segments: &[Line], region: &[usize], from: Option<Point>) -> Vec<Line> {
    let mut remaining: Vec<usize> = region.to_vec();
    let mut chain = Vec::with_capacity(remaining.len());

    let mut cursor = match from {
        Some(p) => p,
        None => {
            let first = remaining.remove(0);
            chain.push(segments[first]);
            segments[first].end()
        }
    };

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        let mut best_reversed = false;

        for (k, &i) in remaining.iter().enumerate() {
            let seg = &segments[i];
            let to_start = cursor.distance(seg.start());
            let to_end = cursor.distance(seg.end());
            if to_start < best_dist {
                best_dist = to_start;
                best = k;
                best_reversed = false;
            }
            if to_end < best_dist {
                best_dist = to_end;
                best = k;
                best_reversed = true;
            }
        }

        let seg = segments[remaining.remove(best)];
        let seg = if best_reversed { seg.reversed() } else { seg };
        cursor = seg.end();
        chain.push(seg);
    }

    chain
}

/// Turn clipped fill rows into an ordered stitch list.
///
/// Inside a region, a connection longer than `tie_distance` starts the next
/// row with a jump. Between regions, a gap longer than `jump_threshold`
/// inserts a trim marker at the last stitch before the next region.
pub fn order_segments(segments: &[Line], settings: &FillSettings, rng: &mut Rng) -> Vec<Stitch> {
    let regions = partition_regions(segments, settings.region_proximity());
    let ordered = order_regions(segments, &regions);
    let row_settings = settings.row_settings();

    let mut stitches: Vec<Stitch> = Vec::new();
    let mut trims = 0usize;
    let mut jumps = 0usize;

    for (r, chain) in ordered.iter().enumerate() {
        for (k, seg) in chain.iter().enumerate() {
            let start = seg.start();
            let last = stitches.last().map(Stitch::point);

            match last {
                Some(prev) if k == 0 && r > 0 && prev.distance(start) > settings.jump_threshold => {
                    stitches.push(Stitch::trim(prev));
                    stitches.push(Stitch::jump(start));
                    trims += 1;
                }
                Some(prev) if prev.distance(start) > settings.tie_distance => {
                    stitches.push(Stitch::jump(start));
                    jumps += 1;
                }
                _ => stitches.push(Stitch::at(start)),
            }

            let mut row = Vec::new();
            straight_segment(start, seg.end(), &row_settings, rng, &mut row);
            stitches.extend(row.into_iter().map(Stitch::at));
        }
    }

    debug!(
        segments = segments.len(),
        regions = regions.len(),
        trims,
        jumps,
        "fill rows ordered"
    );
    stitches
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::StitchCommand;

    fn rows(x0: f64, x1: f64, count: usize, spacing: f64) -> Vec<Line> {
        (0..count)
            .map(|i| Line::new(x0, i as f64 * spacing, x1, i as f64 * spacing))
            .collect()
    }

    #[test]
    fn adjacent_rows_form_one_region() {
        let segs = rows(0.0, 10.0, 5, 0.5);
        let regions = partition_regions(&segs, 1.5);
        assert_eq!(regions, vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn separated_blocks_form_two_regions() {
        let mut segs = rows(0.0, 10.0, 3, 0.5);
        segs.extend(rows(30.0, 40.0, 3, 0.5));
        let regions = partition_regions(&segs, 1.5);
        assert_eq!(regions, vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn chain_reverses_to_nearest_end() {
        // Both rows run left to right; the second should be sewn backwards.
        let segs = vec![Line::new(0.0, 0.0, 10.0, 0.0), Line::new(0.0, 0.5, 10.0, 0.5)];
        let chain = chain_region(&segs, &[0, 1], None);
        assert_eq!(chain[1], Line::new(10.0, 0.5, 0.0, 0.5));
    }

    #[test]
    fn far_region_gets_trim() {
        let mut segs = rows(0.0, 10.0, 3, 0.5);
        segs.extend(rows(40.0, 50.0, 3, 0.5));
        let settings = FillSettings::default();
        let stitches = order_segments(&segs, &settings, &mut Rng::new(0));

        let trims: Vec<&Stitch> = stitches
            .iter()
            .filter(|s| s.command == Some(StitchCommand::Trim))
            .collect();
        assert_eq!(trims.len(), 1);

        let trim_at = stitches
            .iter()
            .position(|s| s.command == Some(StitchCommand::Trim))
            .unwrap();
        assert!(stitches[trim_at + 1].is_jump());
        assert!(stitches[trim_at + 1].x >= 40.0);
    }

    #[test]
    fn near_region_is_not_trimmed() {
        let mut segs = rows(0.0, 10.0, 3, 0.5);
        // Just past the proximity threshold but well inside jump_threshold.
        segs.extend(rows(13.0, 20.0, 3, 0.5));
        let settings = FillSettings::default();
        assert_eq!(partition_regions(&segs, settings.region_proximity()).len(), 2);

        let stitches = order_segments(&segs, &settings, &mut Rng::new(0));
        assert!(stitches.iter().all(|s| s.command.is_none()));
    }

    #[test]
    fn long_tie_inside_region_becomes_jump() {
        // A U: two long arms joined only at the bottom row.
        let segs = vec![
            Line::new(0.0, 0.0, 40.0, 0.0),
            Line::new(0.0, 0.5, 2.0, 0.5),
            Line::new(38.0, 0.5, 40.0, 0.5),
            Line::new(0.0, 1.0, 2.0, 1.0),
            Line::new(38.0, 1.0, 40.0, 1.0),
        ];
        let settings = FillSettings::default().with_spacing(0.5);
        let stitches = order_segments(&segs, &settings, &mut Rng::new(0));
        assert!(stitches.iter().any(Stitch::is_jump));
        assert!(stitches.iter().all(|s| s.command != Some(StitchCommand::Trim)));
    }

    #[test]
    fn empty_input() {
        assert!(order_segments(&[], &FillSettings::default(), &mut Rng::new(0)).is_empty());
    }
}
