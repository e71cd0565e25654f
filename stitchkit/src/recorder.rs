//! Recording session.
//!
//! A [`Recorder`] is the explicit replacement for global drawing state: it
//! owns the pattern being built, the active settings and the noise source,
//! and turns drawing calls (`line`, `polygon`, `ellipse`, ...) into runs.
//!
//! # Example
//! ```
//! use stitchkit::geometry::Point;
//! use stitchkit::pattern::Color;
//! use stitchkit::recorder::Recorder;
//!
//! let mut rec = Recorder::new(100.0, 100.0, 42);
//! rec.stroke(Color::new(200, 0, 0));
//! rec.line(Point::new(10.0, 10.0), Point::new(60.0, 10.0));
//! let pattern = rec.finish();
//! assert!(pattern.stitch_count() > 0);
//! ```

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::SettingsResult;
use crate::fill;
use crate::generators::{self, generate_straight};
use crate::geometry::{Point, convex_hull, expand_polygon};
use crate::pattern::{Color, Pattern, Stitch, runs_from_stitches};
use crate::rng::Rng;
use crate::settings::{FillSettings, StitchSettings};

/// Ellipses are flattened to at most this many segments.
const MAX_ELLIPSE_SEGMENTS: usize = 360;
const MIN_ELLIPSE_SEGMENTS: usize = 12;

/// Builds a [`Pattern`] from drawing calls.
#[derive(Debug, Clone)]
pub struct Recorder {
    pattern: Pattern,
    stitch_settings: StitchSettings,
    fill_settings: FillSettings,
    rng: Rng,
    stroke: Option<Color>,
    fill: Option<Color>,
    active_thread: Option<usize>,
    fills_done: usize,
}

impl Recorder {
    /// Start a session with default settings, a black stroke and no fill.
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self {
            pattern: Pattern::new(width, height),
            stitch_settings: StitchSettings::default(),
            fill_settings: FillSettings::default(),
            rng: Rng::new(seed),
            stroke: Some(Color::BLACK),
            fill: None,
            active_thread: None,
            fills_done: 0,
        }
    }

    /// Replace the stroke settings after validating them.
    pub fn set_stitch_settings(&mut self, settings: StitchSettings) -> SettingsResult<()> {
        settings.validate()?;
        self.stitch_settings = settings;
        Ok(())
    }

    /// Replace the fill settings after validating them.
    pub fn set_fill_settings(&mut self, settings: FillSettings) -> SettingsResult<()> {
        settings.validate()?;
        self.fill_settings = settings;
        Ok(())
    }

    pub fn stitch_settings(&self) -> &StitchSettings {
        &self.stitch_settings
    }

    pub fn fill_settings(&self) -> &FillSettings {
        &self.fill_settings
    }

    pub fn stroke(&mut self, color: Color) {
        self.stroke = Some(color);
    }

    pub fn fill(&mut self, color: Color) {
        self.fill = Some(color);
    }

    pub fn no_stroke(&mut self) {
        self.stroke = None;
    }

    pub fn no_fill(&mut self) {
        self.fill = None;
    }

    /// The pattern recorded so far.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// End the session and hand over the pattern.
    pub fn finish(self) -> Pattern {
        self.pattern
    }

    // ========================================================================
    // DRAWING CALLS
    // ========================================================================

    pub fn line(&mut self, a: Point, b: Point) {
        self.polyline(&[a, b]);
    }

    /// Stroke an open path.
    pub fn polyline(&mut self, points: &[Point]) {
        let Some(color) = self.stroke else {
            return;
        };
        if points.len() < 2 {
            return;
        }
        let stitches = generators::generate(points, &self.stitch_settings, &mut self.rng);
        self.sew(color, stitches, self.stitch_settings.jump_threshold);
    }

    /// Fill (if a fill color is set) and then stroke a closed shape.
    pub fn polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }

        if let Some(color) = self.fill {
            let settings = self.next_fill_settings();
            let stitches = fill::fill(points, &settings, &mut self.rng);
            self.sew(color, stitches, settings.jump_threshold);
        }

        if self.stroke.is_some() {
            let mut closed = points.to_vec();
            if closed.first() != closed.last() {
                closed.push(points[0]);
            }
            self.polyline(&closed);
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.polygon(&[
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]);
    }

    /// An ellipse flattened into a polygon, roughly one vertex per mm of
    /// circumference.
    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let (rx, ry) = (rx.abs(), ry.abs());
        // Ramanujan's approximation.
        let h = ((rx - ry) / (rx + ry).max(f64::EPSILON)).powi(2);
        let circumference = std::f64::consts::PI * (rx + ry) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        let segments = (circumference.ceil() as usize).clamp(MIN_ELLIPSE_SEGMENTS, MAX_ELLIPSE_SEGMENTS);

        let points: Vec<Point> = (0..segments)
            .map(|i| {
                let t = TAU * i as f64 / segments as f64;
                Point::new(cx + rx * t.cos(), cy + ry * t.sin())
            })
            .collect();
        self.polygon(&points);
    }

    /// Cut the active thread at its last stitch.
    pub fn trim(&mut self) {
        if let Some(thread) = self.active_thread {
            self.pattern.trim_thread(thread);
        }
    }

    /// Sew a closed border around everything recorded so far.
    ///
    /// The border is the convex hull of all stitches grown by `offset` mm,
    /// stitched straight in `color`. Returns false when there is nothing to
    /// surround.
    pub fn outline(&mut self, offset: f64, color: Color) -> bool {
        let points: Vec<Point> = self.pattern.stitches().map(Stitch::point).collect();
        let hull = convex_hull(&points);
        if hull.len() < 3 {
            return false;
        }

        let mut border = expand_polygon(&hull, offset);
        border.push(border[0]);

        let settings = self.stitch_settings.clone().with_stroke_weight(0.0);
        let stitches: Vec<Stitch> = generate_straight(&border, &settings, &mut self.rng)
            .into_iter()
            .map(Stitch::at)
            .collect();
        self.sew(color, stitches, settings.jump_threshold);
        true
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Fill settings for the next fill, applying `alternate_angle`.
    fn next_fill_settings(&mut self) -> FillSettings {
        let mut settings = self.fill_settings.clone();
        if settings.alternate_angle && self.fills_done % 2 == 1 {
            settings.angle += FRAC_PI_2;
        }
        self.fills_done += 1;
        settings
    }

    /// Append generated stitches to the thread for `color`.
    ///
    /// Switching threads trims the previous one. Starting farther than
    /// `jump_threshold` from where this thread last stopped trims it first.
    fn sew(&mut self, color: Color, stitches: Vec<Stitch>, jump_threshold: f64) {
        let Some(first) = stitches.first().map(Stitch::point) else {
            return;
        };

        let thread = self.pattern.thread_index_for(color);
        if let Some(previous) = self.active_thread
            && previous != thread
        {
            self.pattern.trim_thread(previous);
        }
        self.active_thread = Some(thread);

        if let Some(last) = self.pattern.last_stitch(thread)
            && last.distance(first) > jump_threshold
        {
            self.pattern.trim_thread(thread);
        }

        self.pattern.add_runs(thread, runs_from_stitches(stitches));
    }
}
