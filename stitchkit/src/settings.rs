//! Stitch and fill settings.
//!
//! Both settings types deserialize from partial configs (missing fields take
//! their defaults) and are validated once before use, so the generators can
//! assume sane values.

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

/// How a stroked path is turned into stitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    /// Running stitch along the path.
    #[default]
    Straight,
    /// Satin-like oscillation across the path.
    Zigzag,
    /// Several parallel running stitches filling the stroke width.
    Lines,
    /// Alternating dashes of parallel lines and single running stitch.
    Sashiko,
}

impl StrokeMode {
    pub fn name(&self) -> &'static str {
        match self {
            StrokeMode::Straight => "straight",
            StrokeMode::Zigzag => "zigzag",
            StrokeMode::Lines => "lines",
            StrokeMode::Sashiko => "sashiko",
        }
    }

    /// Parse a mode from its name (case-insensitive, a few aliases).
    pub fn from_name(name: &str) -> Option<StrokeMode> {
        match name.to_lowercase().as_str() {
            "straight" | "running" => Some(StrokeMode::Straight),
            "zigzag" | "satin" => Some(StrokeMode::Zigzag),
            "lines" | "multiline" | "multi-line" => Some(StrokeMode::Lines),
            "sashiko" => Some(StrokeMode::Sashiko),
            _ => None,
        }
    }

    pub fn all() -> &'static [StrokeMode] {
        &[
            StrokeMode::Straight,
            StrokeMode::Zigzag,
            StrokeMode::Lines,
            StrokeMode::Sashiko,
        ]
    }

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            StrokeMode::Straight => "running stitch along the path",
            StrokeMode::Zigzag => "zigzag across the stroke width",
            StrokeMode::Lines => "parallel running stitches across the stroke width",
            StrokeMode::Sashiko => "alternating multi-line and running dashes",
        }
    }
}

/// Settings for stroked paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchSettings {
    /// Target stitch length in mm.
    pub stitch_length: f64,
    /// Shortest stitch worth placing, in mm.
    pub min_stitch_length: f64,
    /// Stitch length perturbation as a fraction of `stitch_length` (0..1).
    pub resample_noise: f64,
    /// Stroke width in mm used by zigzag, lines and sashiko. Zero forces straight.
    pub stroke_weight: f64,
    /// Pitch between parallel lines in multi-line mode, in mm.
    pub stitch_width: f64,
    pub stroke_mode: StrokeMode,
    /// Gaps longer than this between runs of one thread get a trim.
    pub jump_threshold: f64,
}

impl Default for StitchSettings {
    fn default() -> Self {
        Self {
            stitch_length: 3.0,
            min_stitch_length: 1.0,
            resample_noise: 0.0,
            stroke_weight: 0.0,
            stitch_width: 0.5,
            stroke_mode: StrokeMode::Straight,
            jump_threshold: 10.0,
        }
    }
}

impl StitchSettings {
    pub fn with_stitch_length(mut self, stitch_length: f64) -> Self {
        self.stitch_length = stitch_length;
        self
    }

    pub fn with_min_stitch_length(mut self, min_stitch_length: f64) -> Self {
        self.min_stitch_length = min_stitch_length;
        self
    }

    pub fn with_resample_noise(mut self, resample_noise: f64) -> Self {
        self.resample_noise = resample_noise;
        self
    }

    pub fn with_stroke_weight(mut self, stroke_weight: f64) -> Self {
        self.stroke_weight = stroke_weight;
        self
    }

    pub fn with_stitch_width(mut self, stitch_width: f64) -> Self {
        self.stitch_width = stitch_width;
        self
    }

    pub fn with_stroke_mode(mut self, stroke_mode: StrokeMode) -> Self {
        self.stroke_mode = stroke_mode;
        self
    }

    pub fn with_jump_threshold(mut self, jump_threshold: f64) -> Self {
        self.jump_threshold = jump_threshold;
        self
    }

    /// The mode actually used: a zero stroke weight always means straight.
    pub fn effective_mode(&self) -> StrokeMode {
        if self.stroke_weight <= 0.0 {
            StrokeMode::Straight
        } else {
            self.stroke_mode
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        check_positive("stitch_length", self.stitch_length)?;
        check_min_length(self.min_stitch_length, self.stitch_length)?;
        check_range("resample_noise", self.resample_noise, 0.0, 1.0)?;
        check_non_negative("stroke_weight", self.stroke_weight)?;
        check_positive("stitch_width", self.stitch_width)?;
        check_non_negative("jump_threshold", self.jump_threshold)?;
        Ok(())
    }
}

/// Settings for filled shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    pub stitch_length: f64,
    /// Row pitch in mm.
    pub spacing: f64,
    pub min_stitch_length: f64,
    pub resample_noise: f64,
    /// Row direction in radians.
    pub angle: f64,
    /// Connections inside a region longer than this become jumps.
    pub tie_distance: f64,
    /// Successive fills alternate between `angle` and `angle + π/2`.
    pub alternate_angle: bool,
    /// Gaps longer than this between fill regions get a trim.
    pub jump_threshold: f64,
    /// Rows join one region when endpoints are within this many `spacing`s.
    pub region_proximity_factor: f64,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            stitch_length: 3.0,
            spacing: 0.5,
            min_stitch_length: 0.5,
            resample_noise: 0.0,
            angle: 0.0,
            tie_distance: 15.0,
            alternate_angle: false,
            jump_threshold: 10.0,
            region_proximity_factor: 3.0,
        }
    }
}

impl FillSettings {
    pub fn with_stitch_length(mut self, stitch_length: f64) -> Self {
        self.stitch_length = stitch_length;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_min_stitch_length(mut self, min_stitch_length: f64) -> Self {
        self.min_stitch_length = min_stitch_length;
        self
    }

    pub fn with_resample_noise(mut self, resample_noise: f64) -> Self {
        self.resample_noise = resample_noise;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_tie_distance(mut self, tie_distance: f64) -> Self {
        self.tie_distance = tie_distance;
        self
    }

    pub fn with_alternate_angle(mut self, alternate_angle: bool) -> Self {
        self.alternate_angle = alternate_angle;
        self
    }

    pub fn with_jump_threshold(mut self, jump_threshold: f64) -> Self {
        self.jump_threshold = jump_threshold;
        self
    }

    pub fn with_region_proximity_factor(mut self, factor: f64) -> Self {
        self.region_proximity_factor = factor;
        self
    }

    /// Distance under which two rows belong to the same region.
    pub fn region_proximity(&self) -> f64 {
        self.region_proximity_factor * self.spacing
    }

    /// Straight-stitch settings used for each fill row.
    pub fn row_settings(&self) -> StitchSettings {
        StitchSettings::default()
            .with_stitch_length(self.stitch_length)
            .with_min_stitch_length(self.min_stitch_length)
            .with_resample_noise(self.resample_noise)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        check_positive("stitch_length", self.stitch_length)?;
        check_positive("spacing", self.spacing)?;
        check_min_length(self.min_stitch_length, self.stitch_length)?;
        check_range("resample_noise", self.resample_noise, 0.0, 1.0)?;
        if !self.angle.is_finite() {
            return Err(SettingsError::InvalidValue {
                name: "angle".to_string(),
                reason: "must be a finite number of radians".to_string(),
            });
        }
        check_non_negative("tie_distance", self.tie_distance)?;
        check_non_negative("jump_threshold", self.jump_threshold)?;
        check_positive("region_proximity_factor", self.region_proximity_factor)?;
        Ok(())
    }
}

// ============================================================================
// VALIDATION HELPERS
// ============================================================================

fn check_range(name: &str, value: f64, min: f64, max: f64) -> SettingsResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        })
    }
}

fn check_positive(name: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be greater than zero, got {value}"),
        })
    }
}

fn check_non_negative(name: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidValue {
            name: name.to_string(),
            reason: format!("must not be negative, got {value}"),
        })
    }
}

/// The shortest stitch may not exceed the nominal one.
fn check_min_length(min: f64, stitch_length: f64) -> SettingsResult<()> {
    check_non_negative("min_stitch_length", min)?;
    if min > stitch_length {
        return Err(SettingsError::Incompatible(format!(
            "min_stitch_length {min} exceeds stitch_length {stitch_length}"
        )));
    }
    Ok(())
}
