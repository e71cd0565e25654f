//! Inspect command: print what a DST file contains.

use std::fs;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::warn;

use stitchkit::dst::{self, DstHeader, DstStats, UNITS_PER_MM};

use super::common::take_value;

/// Header and record summary of one file.
pub struct Inspection {
    pub header: DstHeader,
    pub stats: DstStats,
    pub records: usize,
}

/// Decode a DST buffer and cross-check the header against the records.
pub fn inspect_bytes(buf: &[u8]) -> Result<Inspection> {
    let header = dst::read_header(buf)?;
    let records = dst::decode_records(buf)?;
    if header.record_count as usize != records.len() {
        warn!(
            header = header.record_count,
            decoded = records.len(),
            "record count in header does not match the file"
        );
    }
    Ok(Inspection {
        stats: dst::stats(&records),
        records: records.len(),
        header,
    })
}

impl Inspection {
    pub fn to_json(&self) -> serde_json::Value {
        let h = &self.header;
        json!({
            "label": h.label,
            "records": self.records,
            "header": {
                "records": h.record_count,
                "color_changes": h.color_changes,
                "extents": { "min_x": h.min_x, "max_x": h.max_x, "min_y": h.min_y, "max_y": h.max_y },
                "end": { "x": h.end_x, "y": h.end_y },
            },
            "stats": {
                "stitches": self.stats.stitches,
                "jumps": self.stats.jumps,
                "trims": self.stats.trims,
                "color_changes": self.stats.color_changes,
            },
        })
    }

    pub fn to_text(&self) -> String {
        let h = &self.header;
        let mm = |units: i32| units as f64 / UNITS_PER_MM;
        let mut out = String::new();
        out.push_str(&format!("Label:         {}\n", h.label));
        out.push_str(&format!("Records:       {} (header says {})\n", self.records, h.record_count));
        out.push_str(&format!(
            "Size:          {:.1} x {:.1} mm\n",
            mm(h.max_x - h.min_x),
            mm(h.max_y - h.min_y)
        ));
        out.push_str(&format!(
            "Extents:       x {:+} .. {:+}, y {:+} .. {:+} (0.1 mm)\n",
            h.min_x, h.max_x, h.min_y, h.max_y
        ));
        out.push_str(&format!("End:           {:+}, {:+}\n", h.end_x, h.end_y));
        out.push_str(&format!("Stitches:      {}\n", self.stats.stitches));
        out.push_str(&format!("Jumps:         {}\n", self.stats.jumps));
        out.push_str(&format!("Trims:         {}\n", self.stats.trims));
        out.push_str(&format!("Color changes: {}\n", self.stats.color_changes));
        out
    }
}

/// Execute the inspect command.
pub fn cmd_inspect(args: &[String]) -> Result<()> {
    let mut path: Option<&str> = None;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => as_json = true,
            "-f" | "--format" => {
                let flag = args[i].clone();
                match take_value(args, &mut i, &flag)? {
                    "json" => as_json = true,
                    "text" => as_json = false,
                    other => bail!("unknown format {other:?}; use 'text' or 'json'"),
                }
            }
            arg if !arg.starts_with('-') => path = Some(arg),
            other => bail!("unknown option {other:?}"),
        }
        i += 1;
    }

    let Some(path) = path else {
        bail!("usage: stitchkit inspect <file.dst> [--json]");
    };
    let buf = fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let inspection = inspect_bytes(&buf).with_context(|| format!("{path} is not a DST file"))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&inspection.to_json())?);
    } else {
        print!("{}", inspection.to_text());
    }
    Ok(())
}
