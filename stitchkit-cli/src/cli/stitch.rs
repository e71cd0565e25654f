//! Stitch command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use stitchkit::{
    Color, ExportOptions, FillSettings, Pattern, Recorder, StitchSettings, StrokeMode,
    SvgDocument, import_svg, write_to_path,
};

use super::common::{parse_color, parse_value, take_value};
use super::recipe::Recipe;

/// Everything needed to turn a document into a pattern.
#[derive(Debug, Clone)]
pub struct StitchJob {
    pub seed: u64,
    pub stitch: StitchSettings,
    pub fill: FillSettings,
    /// Overrides every path's paint.
    pub thread: Option<Color>,
    pub outline: Option<(f64, Color)>,
}

/// Sew every path of an imported document.
///
/// Closed paths are filled with their fill color and outlined with their
/// stroke; open paths are stroked only. With a zero configured stroke
/// weight, each path's own SVG stroke width is used.
pub fn sew_document(doc: &SvgDocument, job: &StitchJob) -> Result<Pattern> {
    let mut rec = Recorder::new(doc.width, doc.height, job.seed);
    rec.set_fill_settings(job.fill.clone())?;

    for path in &doc.paths {
        let paint = |c: Option<Color>| c.map(|c| job.thread.unwrap_or(c));
        match paint(path.stroke) {
            Some(color) => rec.stroke(color),
            None => rec.no_stroke(),
        }
        match paint(path.fill) {
            Some(color) => rec.fill(color),
            None => rec.no_fill(),
        }

        let mut settings = job.stitch.clone();
        if settings.stroke_weight <= 0.0 {
            settings.stroke_weight = path.stroke_width;
        }
        rec.set_stitch_settings(settings)?;

        if path.closed {
            rec.polygon(&path.points);
        } else {
            rec.polyline(&path.points);
        }
    }

    if let Some((offset, color)) = job.outline {
        rec.set_stitch_settings(job.stitch.clone())?;
        if !rec.outline(offset, color) {
            debug!("nothing to outline");
        }
    }
    Ok(rec.finish())
}

/// Execute the stitch command.
pub fn cmd_stitch(args: &[String]) -> Result<()> {
    let mut input: Option<&str> = None;
    let mut output: Option<&str> = None;
    let mut recipe_path: Option<&str> = None;
    let mut label: Option<&str> = None;
    let mut seed: Option<u64> = None;
    let mut mode: Option<StrokeMode> = None;
    let mut stitch_length: Option<f64> = None;
    let mut stroke_weight: Option<f64> = None;
    let mut spacing: Option<f64> = None;
    let mut angle_deg: Option<f64> = None;
    let mut scale: Option<f64> = None;
    let mut thread: Option<Color> = None;
    let mut outline: Option<f64> = None;
    let mut json_path: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-o" | "--output" => output = Some(take_value(args, &mut i, flag)?),
            "-r" | "--recipe" => recipe_path = Some(take_value(args, &mut i, flag)?),
            "--label" => label = Some(take_value(args, &mut i, flag)?),
            "--seed" => seed = Some(parse_value(flag, take_value(args, &mut i, flag)?)?),
            "-m" | "--mode" => {
                let name = take_value(args, &mut i, flag)?;
                match StrokeMode::from_name(name) {
                    Some(m) => mode = Some(m),
                    None => bail!("unknown stroke mode {name:?}; run `stitchkit modes`"),
                }
            }
            "-l" | "--stitch-length" => {
                stitch_length = Some(parse_value(flag, take_value(args, &mut i, flag)?)?)
            }
            "-w" | "--stroke-weight" => {
                stroke_weight = Some(parse_value(flag, take_value(args, &mut i, flag)?)?)
            }
            "-s" | "--spacing" => spacing = Some(parse_value(flag, take_value(args, &mut i, flag)?)?),
            "-a" | "--angle" => angle_deg = Some(parse_value(flag, take_value(args, &mut i, flag)?)?),
            "--scale" => scale = Some(parse_value(flag, take_value(args, &mut i, flag)?)?),
            "--thread" => thread = Some(parse_color(take_value(args, &mut i, flag)?)?),
            "--outline" => outline = Some(parse_value(flag, take_value(args, &mut i, flag)?)?),
            "--json" => json_path = Some(take_value(args, &mut i, flag)?),
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            arg if !arg.starts_with('-') => input = Some(arg),
            other => bail!("unknown option {other:?}"),
        }
        i += 1;
    }

    let Some(input) = input else {
        print_usage();
        bail!("no input file given");
    };

    let mut recipe = match recipe_path {
        Some(path) => Recipe::load(path)?,
        None => Recipe::default(),
    };

    // Flags override the recipe.
    if let Some(m) = mode {
        recipe.stitch.stroke_mode = m;
    }
    if let Some(len) = stitch_length {
        recipe.stitch.stitch_length = len;
        recipe.fill.stitch_length = len;
    }
    if let Some(w) = stroke_weight {
        recipe.stitch.stroke_weight = w;
    }
    if let Some(s) = spacing {
        recipe.fill.spacing = s;
    }
    if let Some(deg) = angle_deg {
        recipe.fill.angle = deg.to_radians();
    }
    if let Some(s) = scale {
        recipe.svg.scale = s;
    }
    if let Some(offset) = outline {
        let color = recipe.outline_settings()?.map(|(_, c)| c).unwrap_or(Color::BLACK);
        recipe.outline = Some(super::recipe::Outline {
            offset,
            color: Some(color.to_hex()),
        });
    }
    recipe.stitch.validate().context("invalid stitch settings")?;
    recipe.fill.validate().context("invalid fill settings")?;

    let output: PathBuf = match output.map(str::to_string).or_else(|| recipe.output.clone()) {
        Some(path) => path.into(),
        None => bail!("no output file given (use -o or set `output` in the recipe)"),
    };

    let pattern = if has_extension(Path::new(input), "json") {
        let content =
            fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;
        Pattern::from_json(&content).with_context(|| format!("failed to load pattern {input}"))?
    } else {
        let content =
            fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;
        let doc = import_svg(&content, &recipe.svg)
            .with_context(|| format!("failed to import {input}"))?;
        info!(paths = doc.paths.len(), width = doc.width, height = doc.height, "loaded SVG");

        let seed = seed.or(recipe.seed).unwrap_or_else(rand::random::<u64>);
        let job = StitchJob {
            seed,
            stitch: recipe.stitch.clone(),
            fill: recipe.fill.clone(),
            thread: thread.map_or_else(|| recipe.thread_color(), |c| Ok(Some(c)))?,
            outline: recipe.outline_settings()?,
        };
        eprintln!("Seed: {seed}");
        sew_document(&doc, &job)?
    };

    if let Some(path) = json_path {
        fs::write(path, pattern.to_json()?).with_context(|| format!("failed to write {path}"))?;
        eprintln!("Wrote: {path}");
    }

    let label = label
        .map(str::to_string)
        .or_else(|| recipe.label.clone())
        .or_else(|| {
            Path::new(input)
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "stitchkit".to_string());
    let options = ExportOptions::default()
        .with_label(label)
        .with_gcode(recipe.gcode);

    let written = write_to_path(&pattern, &output, &options)
        .with_context(|| format!("failed to export {}", output.display()))?;
    if written {
        eprintln!(
            "Wrote: {} ({} stitches, {} colors)",
            output.display(),
            pattern.stitch_count(),
            pattern.color_count()
        );
    } else {
        eprintln!("Nothing to stitch; {} not written", output.display());
    }
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn print_usage() {
    eprintln!("stitchkit stitch - Turn an SVG (or pattern JSON) into DST or G-code");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    stitchkit stitch <input.svg|pattern.json> -o <out.dst|out.gcode> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -o, --output <file>        Output file; format from the extension");
    eprintln!("    -r, --recipe <file>        YAML recipe (see `stitchkit recipe`)");
    eprintln!("    -m, --mode <mode>          Stroke mode (see `stitchkit modes`)");
    eprintln!("    -l, --stitch-length <mm>   Stitch length for strokes and fills");
    eprintln!("    -w, --stroke-weight <mm>   Stroke width (0 uses the SVG stroke width)");
    eprintln!("    -s, --spacing <mm>         Fill row spacing");
    eprintln!("    -a, --angle <deg>          Fill row angle");
    eprintln!("    --scale <mm>               Millimeters per SVG user unit");
    eprintln!("    --thread <#rrggbb>         Sew everything in one color");
    eprintln!("    --outline <mm>             Sew a border this far around the design");
    eprintln!("    --seed <n>                 Noise seed (random by default)");
    eprintln!("    --label <name>             DST header label");
    eprintln!("    --json <file>              Also save the pattern as JSON");
}
