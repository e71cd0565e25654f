//! Error types for stitchkit.
//!
//! Each stage of the pipeline has its own error enum so callers can tell a
//! bad setting apart from a malformed pattern or an unsupported export.

use std::io;
use thiserror::Error;

/// Errors raised while validating stitch or fill settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A setting is outside its valid range.
    #[error("Setting '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A setting value is invalid for another reason.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Two settings contradict each other.
    #[error("Incompatible settings: {0}")]
    Incompatible(String),
}

/// Errors describing a structurally invalid pattern.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The pattern has no threads at all.
    #[error("Pattern has no threads")]
    NoThreads,

    /// A required field is missing from the pattern structure.
    #[error("Pattern is missing required field: {0}")]
    MissingField(String),

    /// The pattern spans more than a DST header can describe.
    #[error("Pattern too large for DST: {width:.1} x {height:.1} mm")]
    TooLarge { width: f64, height: f64 },

    /// The serialized pattern could not be decoded.
    #[error("Malformed pattern: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while exporting a pattern.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The requested file format is not supported.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The pattern failed validation.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    /// I/O error while writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while importing vector paths from SVG.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The SVG document could not be parsed.
    #[error("SVG parse error: {0}")]
    Parse(String),

    /// The document contains no stitchable paths.
    #[error("No paths found in SVG")]
    NoPaths,
}

/// Errors raised while reading back a DST buffer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is shorter than the fixed header.
    #[error("DST buffer truncated: {len} bytes")]
    Truncated { len: usize },

    /// A header field is missing or unreadable.
    #[error("Bad DST header: {0}")]
    BadHeader(String),
}

/// Result type alias for settings validation.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for pattern validation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for SVG import.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_error_display() {
        let err = SettingsError::OutOfRange {
            name: "resample_noise".to_string(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Setting 'resample_noise' out of range: 1.5 (valid: 0..1)"
        );
    }

    #[test]
    fn export_error_display() {
        let err = ExportError::UnsupportedFormat("pes".to_string());
        assert_eq!(err.to_string(), "Unsupported export format: pes");

        let err: ExportError = PatternError::NoThreads.into();
        assert_eq!(err.to_string(), "Invalid pattern: Pattern has no threads");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: ExportError = io_err.into();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn json_error_becomes_malformed_pattern() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PatternError = json_err.into();
        assert!(matches!(err, PatternError::Malformed(_)));
    }
}
