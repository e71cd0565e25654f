//! Thread / run / stitch model.
//!
//! A [`Pattern`] is a list of [`Thread`]s in creation order. Each thread
//! holds [`Run`]s: sewing passes, or single control markers (trim, color
//! change). Generators and the fill engine produce stitch lists; the
//! recorder groups them into runs; encoders read the finished pattern.

use serde::{Deserialize, Serialize};

use crate::error::{PatternError, PatternResult};
use crate::geometry::{Bounds, Point};

/// Weight assigned to threads created on demand, in mm.
pub const DEFAULT_THREAD_WEIGHT: f64 = 0.2;

/// Non-sewing instruction attached to a stitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StitchCommand {
    /// Move without sewing.
    Jump,
    /// Cut the thread at this position.
    Trim,
    /// Switch to the next thread.
    ColorChange,
}

/// One needle position in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stitch {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<StitchCommand>,
}

impl Stitch {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, command: None }
    }

    #[inline]
    pub fn at(p: Point) -> Self {
        Self::new(p.x, p.y)
    }

    #[inline]
    pub fn jump(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            command: Some(StitchCommand::Jump),
        }
    }

    #[inline]
    pub fn trim(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            command: Some(StitchCommand::Trim),
        }
    }

    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn is_jump(&self) -> bool {
        self.command == Some(StitchCommand::Jump)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One pass of a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Run {
    /// Stitches sewn in order. May contain jump stitches, never trims.
    Sewing(Vec<Stitch>),
    /// Cut the thread at the given position.
    Trim(Point),
    /// Switch threads at the current position.
    ColorChange,
}

impl Run {
    pub fn stitches(&self) -> &[Stitch] {
        match self {
            Run::Sewing(stitches) => stitches,
            Run::Trim(_) | Run::ColorChange => &[],
        }
    }
}

/// Thread color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(s: &str) -> Option<Color> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();

        match hex.len() {
            6 => Some(Color::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                let r = channel(0, 1)?;
                let g = channel(1, 1)?;
                let b = channel(2, 1)?;
                Some(Color::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// All runs sewn with one color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub color: Color,
    pub weight: f64,
    pub runs: Vec<Run>,
}

impl Thread {
    pub fn new(color: Color, weight: f64) -> Self {
        Self {
            color,
            weight,
            runs: Vec::new(),
        }
    }

    /// Sewing stitches across all runs, in order.
    pub fn stitches(&self) -> impl Iterator<Item = &Stitch> {
        self.runs.iter().flat_map(Run::stitches)
    }

    /// True when the thread has no finite stitch to sew.
    pub fn is_empty(&self) -> bool {
        !self.stitches().any(Stitch::is_finite)
    }

    /// Position of the last sewing stitch, if any.
    pub fn last_point(&self) -> Option<Point> {
        self.runs.iter().rev().find_map(|run| match run {
            Run::Sewing(stitches) => stitches.last().map(Stitch::point),
            _ => None,
        })
    }
}

/// The root aggregate: every thread of one design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub width: f64,
    pub height: f64,
    pub threads: Vec<Thread>,
}

impl Pattern {
    /// New pattern with a single black thread.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            threads: vec![Thread::new(Color::BLACK, DEFAULT_THREAD_WEIGHT)],
        }
    }

    /// Index of the thread with exactly this color.
    ///
    /// Linear search so creation order is preserved; thread counts are small.
    pub fn find_thread(&self, color: Color) -> Option<usize> {
        self.threads.iter().position(|t| t.color == color)
    }

    /// Index of the thread with this color, created at the end if missing.
    pub fn thread_index_for(&mut self, color: Color) -> usize {
        match self.find_thread(color) {
            Some(index) => index,
            None => {
                self.threads.push(Thread::new(color, DEFAULT_THREAD_WEIGHT));
                self.threads.len() - 1
            }
        }
    }

    /// Append a run to a thread. Empty sewing runs are ignored.
    pub fn add_run(&mut self, thread: usize, run: Run) {
        if let Run::Sewing(stitches) = &run
            && stitches.is_empty()
        {
            return;
        }
        if let Some(t) = self.threads.get_mut(thread) {
            t.runs.push(run);
        }
    }

    /// Append several runs, e.g. from [`runs_from_stitches`].
    pub fn add_runs(&mut self, thread: usize, runs: impl IntoIterator<Item = Run>) {
        for run in runs {
            self.add_run(thread, run);
        }
    }

    /// Cut the thread at its last stitch.
    ///
    /// Does nothing if the thread has not sewn yet or is already trimmed.
    /// Returns whether a trim was added.
    pub fn trim_thread(&mut self, thread: usize) -> bool {
        let Some(t) = self.threads.get_mut(thread) else {
            return false;
        };
        let Some(Run::Sewing(stitches)) = t.runs.last() else {
            return false;
        };
        match stitches.last() {
            Some(last) => {
                let at = last.point();
                t.runs.push(Run::Trim(at));
                true
            }
            None => false,
        }
    }

    /// Last sewing position of a thread.
    pub fn last_stitch(&self, thread: usize) -> Option<Point> {
        self.threads.get(thread).and_then(Thread::last_point)
    }

    /// Every sewing stitch in the pattern, thread by thread.
    pub fn stitches(&self) -> impl Iterator<Item = &Stitch> {
        self.threads.iter().flat_map(Thread::stitches)
    }

    /// Needle penetrations: sewing stitches that are not jumps.
    pub fn stitch_count(&self) -> usize {
        self.stitches().filter(|s| !s.is_jump()).count()
    }

    /// Threads that actually sew something.
    pub fn color_count(&self) -> usize {
        self.threads.iter().filter(|t| !t.is_empty()).count()
    }

    /// Bounding box of every finite sewing stitch.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<Point> = self.stitches().map(Stitch::point).collect();
        Bounds::from_points(&points)
    }

    /// True when no thread has anything to sew.
    pub fn is_empty(&self) -> bool {
        self.threads.iter().all(Thread::is_empty)
    }

    /// Check the structural shape encoders rely on.
    pub fn validate(&self) -> PatternResult<()> {
        if self.threads.is_empty() {
            return Err(PatternError::NoThreads);
        }
        Ok(())
    }

    /// Parse the JSON interchange form.
    ///
    /// Missing `threads` or `runs` arrays are reported as
    /// [`PatternError::MissingField`] rather than a generic decode error.
    pub fn from_json(json: &str) -> PatternResult<Pattern> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let threads = value
            .get("threads")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| PatternError::MissingField("threads".to_string()))?;
        for (i, thread) in threads.iter().enumerate() {
            if !thread.get("runs").is_some_and(serde_json::Value::is_array) {
                return Err(PatternError::MissingField(format!("threads[{i}].runs")));
            }
        }

        let pattern: Pattern = serde_json::from_value(value)?;
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn to_json(&self) -> PatternResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Group a generator's stitch list into runs.
///
/// Trim and color-change markers become their own control runs; everything
/// between them is a sewing run.
pub fn runs_from_stitches(stitches: Vec<Stitch>) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Vec<Stitch> = Vec::new();

    for stitch in stitches {
        match stitch.command {
            Some(StitchCommand::Trim) => {
                if !current.is_empty() {
                    runs.push(Run::Sewing(std::mem::take(&mut current)));
                }
                runs.push(Run::Trim(stitch.point()));
            }
            Some(StitchCommand::ColorChange) => {
                if !current.is_empty() {
                    runs.push(Run::Sewing(std::mem::take(&mut current)));
                }
                runs.push(Run::ColorChange);
            }
            Some(StitchCommand::Jump) | None => current.push(stitch),
        }
    }

    if !current.is_empty() {
        runs.push(Run::Sewing(current));
    }
    runs
}
