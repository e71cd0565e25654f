//! G-code toolpath writer.
//!
//! Renders a pattern as a pen-plotter program: each needle penetration is a
//! move down to `z_down` followed by a lift to `z_up` at the same X/Y.
//! Coordinates stay in the pattern's own millimeter space.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PatternResult;
use crate::pattern::{Pattern, Run};

/// Z planes for the synthetic needle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcodeOptions {
    pub z_down: f64,
    pub z_up: f64,
}

impl Default for GcodeOptions {
    fn default() -> Self {
        Self {
            z_down: 0.0,
            z_up: 1.0,
        }
    }
}

impl GcodeOptions {
    pub fn with_z_down(mut self, z_down: f64) -> Self {
        self.z_down = z_down;
        self
    }

    pub fn with_z_up(mut self, z_up: f64) -> Self {
        self.z_up = z_up;
        self
    }
}

/// Converts a [`Pattern`] to G-code text.
#[derive(Debug, Clone, Default)]
pub struct GcodeWriter {
    options: GcodeOptions,
}

impl GcodeWriter {
    pub fn new(options: GcodeOptions) -> Self {
        Self { options }
    }

    pub fn encode(&self, pattern: &Pattern) -> PatternResult<String> {
        pattern.validate()?;

        let mut out = String::new();
        let (min_x, min_y, max_x, max_y) = pattern
            .bounds()
            .map(|b| (b.min_x, b.min_y, b.max_x, b.max_y))
            .unwrap_or_default();

        out.push_str("; stitchkit embroidery toolpath\n");
        out.push_str(&format!("; bounds min X{min_x:.3} Y{min_y:.3} max X{max_x:.3} Y{max_y:.3}\n"));
        out.push_str(&format!("; size {:.3} x {:.3} mm\n", max_x - min_x, max_y - min_y));
        out.push_str(&format!("; stitches {}\n", pattern.stitch_count()));
        out.push_str("G90\n");
        out.push_str("G21\n");

        let (down, up) = (self.options.z_down, self.options.z_up);
        let mut moves = 0usize;

        for (i, thread) in pattern.threads.iter().enumerate().filter(|(_, t)| !t.is_empty()) {
            out.push_str(&format!("; thread {i} color {}\n", thread.color.to_hex()));

            for run in &thread.runs {
                match run {
                    Run::Sewing(stitches) => {
                        for s in stitches {
                            if !s.is_finite() {
                                warn!(x = s.x, y = s.y, "dropping non-finite stitch");
                                continue;
                            }
                            if !s.is_jump() {
                                out.push_str(&format!("G0 X{:.3} Y{:.3} Z{down:.1}\n", s.x, s.y));
                                moves += 1;
                            }
                            out.push_str(&format!("G0 X{:.3} Y{:.3} Z{up:.1}\n", s.x, s.y));
                            moves += 1;
                        }
                    }
                    Run::Trim(p) => {
                        out.push_str(&format!("; trim at X{:.3} Y{:.3}\n", p.x, p.y));
                    }
                    Run::ColorChange => out.push_str("; color change\n"),
                }
            }
        }

        out.push_str("M30\n");
        debug!(moves, "encoded G-code");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::pattern::{Color, Stitch};

    fn pattern() -> Pattern {
        let mut p = Pattern::new(20.0, 20.0);
        p.add_run(0, Run::Sewing(vec![Stitch::new(1.0, 2.0), Stitch::new(4.5, 2.25)]));
        p
    }

    #[test]
    fn preamble_moves_and_end() {
        let gcode = GcodeWriter::default().encode(&pattern()).unwrap();
        let lines: Vec<&str> = gcode.lines().collect();

        assert!(lines[0].starts_with(';'));
        assert_eq!(lines[1], "; bounds min X1.000 Y2.000 max X4.500 Y2.250");
        assert!(lines.contains(&"G90"));
        assert!(lines.contains(&"G21"));
        assert!(lines.contains(&"G0 X1.000 Y2.000 Z0.0"));
        assert!(lines.contains(&"G0 X1.000 Y2.000 Z1.0"));
        assert!(lines.contains(&"G0 X4.500 Y2.250 Z0.0"));
        assert_eq!(lines.last(), Some(&"M30"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("G0")).count(), 4);
    }

    #[test]
    fn down_before_up() {
        let gcode = GcodeWriter::default().encode(&pattern()).unwrap();
        let down = gcode.find("X1.000 Y2.000 Z0.0").unwrap();
        let up = gcode.find("X1.000 Y2.000 Z1.0").unwrap();
        assert!(down < up);
    }

    #[test]
    fn jumps_only_lift_and_trims_comment() {
        let mut p = pattern();
        p.add_run(0, Run::Sewing(vec![Stitch::jump(Point::new(9.0, 9.0))]));
        p.add_run(0, Run::Trim(Point::new(9.0, 9.0)));
        let red = p.thread_index_for(Color::new(255, 0, 0));
        p.add_run(red, Run::Sewing(vec![Stitch::new(0.0, 0.0)]));

        let gcode = GcodeWriter::default().encode(&p).unwrap();
        assert!(gcode.contains("G0 X9.000 Y9.000 Z1.0"));
        assert!(!gcode.contains("G0 X9.000 Y9.000 Z0.0"));
        assert!(gcode.contains("; trim at X9.000 Y9.000"));
        assert!(gcode.contains("; thread 1 color #ff0000"));
    }

    #[test]
    fn custom_planes() {
        let writer = GcodeWriter::new(GcodeOptions::default().with_z_down(-0.5).with_z_up(3.0));
        let gcode = writer.encode(&pattern()).unwrap();
        assert!(gcode.contains("Z-0.5"));
        assert!(gcode.contains("Z3.0"));
    }
}
