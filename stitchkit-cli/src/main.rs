//! stitchkit - embroidery export from the command line
//!
//! Usage:
//!   stitchkit stitch <svg> -o <out.dst>   Stitch an SVG into DST or G-code
//!   stitchkit inspect <file.dst>          Summarize a DST file
//!   stitchkit modes                       List stroke modes
//!   stitchkit recipe                      Print an example recipe

mod cli;

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use stitchkit::StrokeMode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use cli::{cmd_inspect, cmd_recipe, cmd_stitch};

/// Log to stderr so command output on stdout stays clean.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let prog = args.first().map(String::as_str).unwrap_or("stitchkit");
    let Some(command) = args.get(1) else {
        print_usage(prog);
        return Ok(());
    };

    match command.as_str() {
        "stitch" => cmd_stitch(&args[2..]),
        "inspect" => cmd_inspect(&args[2..]),
        "modes" => {
            cmd_modes();
            Ok(())
        }
        "recipe" => {
            cmd_recipe();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage(prog);
            Ok(())
        }
        other => {
            print_usage(prog);
            anyhow::bail!("unknown command {other:?}")
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("stitchkit - embroidery stitch generation and export");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    {prog} stitch <input.svg> -o <out.dst|out.gcode> [OPTIONS]");
    eprintln!("    {prog} inspect <file.dst> [--json]");
    eprintln!("    {prog} modes");
    eprintln!("    {prog} recipe");
    eprintln!();
    eprintln!("Run `{prog} stitch --help` for stitch options.");
    eprintln!("Set RUST_LOG=debug for fill and encoder statistics.");
}

fn cmd_modes() {
    println!("Stroke modes:");
    for mode in StrokeMode::all() {
        println!("  {:<10} {}", mode.name(), mode.description());
    }
}
