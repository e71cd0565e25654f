//! Export dispatch: pick an encoder by file extension and write the result.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dst::DstWriter;
use crate::error::{ExportError, ExportResult};
use crate::gcode::{GcodeOptions, GcodeWriter};
use crate::pattern::Pattern;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dst,
    Gcode,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Dst => "dst",
            ExportFormat::Gcode => "gcode",
        }
    }

    /// Format for a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> ExportResult<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "dst" => Ok(ExportFormat::Dst),
            "gcode" | "nc" | "ngc" => Ok(ExportFormat::Gcode),
            _ => Err(ExportError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> ExportResult<ExportFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }
}

/// Encoder options shared by all formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Design name written into the DST header.
    pub label: String,
    pub gcode: GcodeOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            label: "stitchkit".to_string(),
            gcode: GcodeOptions::default(),
        }
    }
}

impl ExportOptions {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_gcode(mut self, gcode: GcodeOptions) -> Self {
        self.gcode = gcode;
        self
    }
}

/// Encode a pattern.
///
/// Returns `Ok(None)` (and logs a warning) when the pattern has nothing to
/// sew. Structural problems are errors.
pub fn export(
    pattern: &Pattern,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportResult<Option<Vec<u8>>> {
    pattern.validate()?;
    if pattern.is_empty() {
        warn!(format = format.name(), "pattern has no stitches, skipping export");
        return Ok(None);
    }

    let bytes = match format {
        ExportFormat::Dst => DstWriter::new(options.label.clone()).encode(pattern)?,
        ExportFormat::Gcode => GcodeWriter::new(options.gcode)
            .encode(pattern)?
            .into_bytes(),
    };
    Ok(Some(bytes))
}

/// Encode a pattern and write it to `path`, choosing the format from the
/// extension.
///
/// Returns `Ok(false)` when the pattern was empty and nothing was written.
/// Nothing is written if encoding fails.
pub fn write_to_path(pattern: &Pattern, path: &Path, options: &ExportOptions) -> ExportResult<bool> {
    let format = ExportFormat::from_path(path)?;
    let Some(bytes) = export(pattern, format, options)? else {
        return Ok(false);
    };

    fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        format = format.name(),
        bytes = bytes.len(),
        stitches = pattern.stitch_count(),
        "pattern exported"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use crate::pattern::{Run, Stitch};

    fn pattern() -> Pattern {
        let mut p = Pattern::new(10.0, 10.0);
        p.add_run(0, Run::Sewing(vec![Stitch::new(0.0, 0.0), Stitch::new(3.0, 0.0)]));
        p
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_extension("DST").unwrap(), ExportFormat::Dst);
        assert_eq!(ExportFormat::from_extension("nc").unwrap(), ExportFormat::Gcode);
        assert!(matches!(
            ExportFormat::from_extension("pes"),
            Err(ExportError::UnsupportedFormat(ref e)) if e == "pes"
        ));
        assert!(ExportFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn empty_pattern_is_skipped() {
        let empty = Pattern::new(10.0, 10.0);
        assert!(export(&empty, ExportFormat::Dst, &ExportOptions::default()).unwrap().is_none());
    }

    #[test]
    fn threadless_pattern_is_an_error() {
        let mut broken = pattern();
        broken.threads.clear();
        let err = export(&broken, ExportFormat::Gcode, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::Pattern(PatternError::NoThreads)));
    }

    #[test]
    fn dst_and_gcode_bytes() {
        let options = ExportOptions::default().with_label("sample");
        let dst = export(&pattern(), ExportFormat::Dst, &options).unwrap().unwrap();
        assert!(dst.starts_with(b"LA:sample"));

        let gcode = export(&pattern(), ExportFormat::Gcode, &options).unwrap().unwrap();
        assert!(String::from_utf8(gcode).unwrap().ends_with("M30\n"));
    }

    #[test]
    fn pattern_of_only_non_finite_stitches_is_skipped() {
        let mut p = Pattern::new(10.0, 10.0);
        p.add_run(0, Run::Sewing(vec![Stitch::new(f64::NAN, 0.0), Stitch::new(1.0, f64::INFINITY)]));
        assert!(p.is_empty());
        assert!(export(&p, ExportFormat::Dst, &ExportOptions::default()).unwrap().is_none());
        assert!(export(&p, ExportFormat::Gcode, &ExportOptions::default()).unwrap().is_none());
    }

    #[test]
    fn unsupported_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pes");

        assert!(write_to_path(&pattern(), &path, &ExportOptions::default()).is_err());
        assert!(!path.exists());

        let ok = dir.path().join("out.dst");
        assert!(write_to_path(&pattern(), &ok, &ExportOptions::default()).unwrap());
        assert!(ok.exists());
    }

    #[test]
    fn empty_pattern_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dst");
        assert!(!write_to_path(&Pattern::new(10.0, 10.0), &path, &ExportOptions::default()).unwrap());
        assert!(!path.exists());
    }
}
