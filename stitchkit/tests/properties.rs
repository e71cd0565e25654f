//! Property tests for the stitch generators, fill and DST codec.

use proptest::prelude::*;
use stitchkit::dst::{self, MAX_DELTA, RecordKind, UNITS_PER_MM, split_move};
use stitchkit::generators::{generate, generate_straight};
use stitchkit::{
    Bounds, DstWriter, FillSettings, Pattern, Point, Rng, Run, Stitch, StitchSettings, StrokeMode,
    fill::fill,
};

fn straight(len: f64, min: f64) -> StitchSettings {
    StitchSettings::default()
        .with_stitch_length(len)
        .with_min_stitch_length(min)
}

fn point() -> impl Strategy<Value = (f64, f64)> {
    (-200.0f64..200.0, -200.0f64..200.0)
}

proptest! {
    #[test]
    fn delta_round_trips(dx in -MAX_DELTA..=MAX_DELTA, dy in -MAX_DELTA..=MAX_DELTA, jump in any::<bool>()) {
        let kind = if jump { RecordKind::Jump } else { RecordKind::Stitch };
        let rec = dst::decode_record(dst::encode_delta(dx, dy, kind));
        prop_assert_eq!((rec.dx, rec.dy, rec.kind), (dx, dy, kind));
    }

    #[test]
    fn split_move_is_minimal_and_exact(dx in -5000i32..5000, dy in -5000i32..5000) {
        let steps = split_move(dx, dy);
        let longest = dx.abs().max(dy.abs());
        let expected = (longest + MAX_DELTA - 1) / MAX_DELTA;
        prop_assert_eq!(steps.len() as i32, expected);

        let (mut sx, mut sy) = (0, 0);
        for (x, y) in &steps {
            prop_assert!(x.abs() <= MAX_DELTA && y.abs() <= MAX_DELTA);
            sx += x;
            sy += y;
        }
        prop_assert_eq!((sx, sy), (dx, dy));
    }

    #[test]
    fn straight_starts_at_path_start(
        a in point(),
        b in point(),
        len in 0.5f64..8.0,
        noise in 0.0f64..0.4,
        seed in any::<u64>(),
    ) {
        let settings = straight(len, len / 4.0).with_resample_noise(noise);
        let path = [Point::new(a.0, a.1), Point::new(b.0, b.1)];
        let out = generate_straight(&path, &settings, &mut Rng::new(seed));
        prop_assert_eq!(out[0], path[0]);
    }

    #[test]
    fn straight_stitch_count_grows_with_length(
        d1 in 0.0f64..100.0,
        extra in 0.0f64..100.0,
        len in 0.5f64..8.0,
        min_frac in 0.05f64..1.0,
    ) {
        let settings = straight(len, len * min_frac);
        let count = |d: f64| {
            generate_straight(&[Point::new(0.0, 0.0), Point::new(d, 0.0)], &settings, &mut Rng::new(0)).len()
        };
        prop_assert!(count(d1) <= count(d1 + extra));
    }

    #[test]
    fn straight_gaps_never_exceed_stitch_length(d in 0.0f64..300.0, len in 0.5f64..8.0) {
        let settings = straight(len, len / 3.0);
        let out = generate_straight(&[Point::new(0.0, 0.0), Point::new(0.0, d)], &settings, &mut Rng::new(1));
        for w in out.windows(2) {
            prop_assert!(w[0].distance(w[1]) <= len + 1e-6);
        }
    }

    #[test]
    fn generators_are_deterministic(
        pts in prop::collection::vec(point(), 2..8),
        mode in prop::sample::select(StrokeMode::all().to_vec()),
        seed in any::<u64>(),
    ) {
        let path: Vec<Point> = pts.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let settings = StitchSettings::default()
            .with_stroke_mode(mode)
            .with_stroke_weight(2.0)
            .with_resample_noise(0.3);
        let a = generate(&path, &settings, &mut Rng::new(seed));
        let b = generate(&path, &settings, &mut Rng::new(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn fill_stays_inside_expanded_bounds(
        cx in -50.0f64..50.0,
        cy in -50.0f64..50.0,
        radii in prop::collection::vec(5.0f64..40.0, 3..12),
        angle in 0.0f64..std::f64::consts::PI,
        spacing in 0.4f64..3.0,
    ) {
        // A star-shaped polygon: vertices at increasing angles, random radii.
        let n = radii.len() as f64;
        let polygon: Vec<Point> = radii
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let t = i as f64 / n * std::f64::consts::TAU;
                Point::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect();
        let settings = FillSettings::default().with_angle(angle).with_spacing(spacing);
        let bounds = Bounds::from_points(&polygon).unwrap().expanded(spacing);

        let stitches = fill(&polygon, &settings, &mut Rng::new(3));
        prop_assert!(!stitches.is_empty());
        for s in &stitches {
            prop_assert!(bounds.contains(s.point()), "{:?} outside {:?}", s, bounds);
        }
    }

    #[test]
    fn trims_and_splits_land_on_the_last_stitch(
        pts in prop::collection::vec(point(), 1..30),
        trim_every in 1usize..6,
    ) {
        let mut pattern = Pattern::new(400.0, 400.0);
        for (i, &(x, y)) in pts.iter().enumerate() {
            pattern.add_run(0, Run::Sewing(vec![Stitch::new(x, y)]));
            if i % trim_every == 0 {
                pattern.trim_thread(0);
            }
        }

        let records = DstWriter::default().records(&pattern);
        let (ex, ey) = records.iter().fold((0, 0), |(x, y), r| (x + r.dx, y + r.dy));

        let center = pattern.bounds().unwrap().center();
        let last = pts[pts.len() - 1];
        let want = (
            ((last.0 - center.x) * UNITS_PER_MM).round() as i32,
            (-(last.1 - center.y) * UNITS_PER_MM).round() as i32,
        );
        prop_assert_eq!((ex, ey), want);
    }
}
