//! # stitchkit
//!
//! Turns vector paths into embroidery stitches and writes them out as
//! Tajima DST or G-code.
//!
//! ```text
//! points ──► generators / fill ──► Recorder ──► Pattern ──► dst / gcode
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared here with `pub mod`; the most common types are
//! re-exported at the crate root so callers can write `stitchkit::Pattern`
//! instead of `stitchkit::pattern::Pattern`.

pub mod clip;
pub mod dst;
pub mod error;
pub mod export;
pub mod fill;
pub mod gcode;
pub mod generators;
pub mod geometry;
pub mod order;
pub mod pattern;
pub mod recorder;
pub mod rng;
pub mod settings;
pub mod svg;

// Re-export common types at crate root for convenience.
pub use dst::{DstWriter, Record, RecordKind, decode_records, read_header};
pub use error::{DecodeError, ExportError, ImportError, PatternError, SettingsError};
pub use export::{ExportFormat, ExportOptions, export, write_to_path};
pub use gcode::{GcodeOptions, GcodeWriter};
pub use geometry::{Bounds, Line, Point};
pub use pattern::{Color, Pattern, Run, Stitch, StitchCommand, Thread};
pub use recorder::Recorder;
pub use rng::Rng;
pub use settings::{FillSettings, StitchSettings, StrokeMode};
pub use svg::{SvgDocument, SvgImportOptions, VectorPath, import_svg};
