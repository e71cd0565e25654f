//! Stitch recipes.
//!
//! A recipe is a YAML file holding everything `stitchkit stitch` can be told
//! on the command line: settings for strokes and fills, the seed, an
//! optional single thread color and an outline. Every key is optional and
//! command-line flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stitchkit::{Color, FillSettings, GcodeOptions, StitchSettings, SvgImportOptions};

use super::common::parse_color;

/// A complete stitch recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    /// Design name written into the DST header.
    pub label: Option<String>,

    /// Noise seed; a random one is drawn when absent.
    pub seed: Option<u64>,

    /// Sew every path in this color instead of the SVG's own paint.
    pub thread: Option<String>,

    /// Output file used when `-o` is not given.
    pub output: Option<String>,

    pub stitch: StitchSettings,
    pub fill: FillSettings,
    pub svg: SvgImportOptions,
    pub gcode: GcodeOptions,

    /// Border around the finished design.
    pub outline: Option<Outline>,
}

/// Convex border sewn after everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    /// Distance from the design in millimeters.
    pub offset: f64,

    /// Thread color (default black).
    #[serde(default)]
    pub color: Option<String>,
}

impl Recipe {
    /// Load a recipe from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse recipe {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let recipe: Recipe = serde_yaml::from_str(content)?;
        recipe.stitch.validate()?;
        recipe.fill.validate()?;
        Ok(recipe)
    }

    /// The single thread color, if one is set.
    pub fn thread_color(&self) -> Result<Option<Color>> {
        self.thread.as_deref().map(parse_color).transpose()
    }

    /// Outline offset and color, if an outline is requested.
    pub fn outline_settings(&self) -> Result<Option<(f64, Color)>> {
        let Some(outline) = &self.outline else {
            return Ok(None);
        };
        let color = match outline.color.as_deref() {
            Some(hex) => parse_color(hex)?,
            None => Color::BLACK,
        };
        Ok(Some((outline.offset, color)))
    }
}

/// Print an example recipe.
pub fn cmd_recipe() {
    print!("{EXAMPLE_RECIPE}");
}

pub const EXAMPLE_RECIPE: &str = r##"# Example stitchkit recipe. Every key is optional.
label: "flowers"
seed: 42
# thread: "#1f3a93"     # sew everything in one color
output: flowers.dst

stitch:
  stitch_length: 2.5     # mm
  min_stitch_length: 0.8
  resample_noise: 0.1    # fraction of stitch_length
  stroke_weight: 1.5     # mm; 0 uses the SVG stroke width
  stitch_width: 0.4      # line pitch for lines/sashiko
  stroke_mode: sashiko   # straight | zigzag | lines | sashiko
  jump_threshold: 10.0

fill:
  stitch_length: 3.0
  spacing: 0.5           # row pitch in mm
  angle: 0.785           # radians
  alternate_angle: true
  tie_distance: 15.0
  jump_threshold: 10.0

svg:
  scale: 1.0             # mm per SVG user unit
  tolerance: 0.1

gcode:
  z_down: 0.0
  z_up: 1.0

outline:
  offset: 3.0
  color: "#000000"
"##;
