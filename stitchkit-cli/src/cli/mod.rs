//! CLI command implementations.
//!
//! - `stitch` - Turn an SVG or pattern JSON into DST / G-code
//! - `inspect` - Summarize a DST file
//! - `recipe` - Print an example YAML recipe

pub mod common;
pub mod inspect;
pub mod recipe;
pub mod stitch;

pub use inspect::cmd_inspect;
pub use recipe::cmd_recipe;
pub use stitch::cmd_stitch;
