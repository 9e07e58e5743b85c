//! turtlepen: convert raster images into turtle commands for pen plotters.
//!
//! Reads an image, extracts its edges (or reads it as a ready-made binary
//! mask with `--mask`), compiles the foreground into turtle commands and
//! writes the turtle JSON document. Optionally writes an SVG preview and
//! prints per-stage diagnostics.
//!
//! # Usage
//!
//! ```text
//! turtlepen [OPTIONS] <IMAGE_PATH>
//! RUST_LOG=debug turtlepen photo.jpg -o photo.json --svg photo.svg
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use turtlepen_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use turtlepen_pipeline::{PipelineConfig, Program};

/// Convert a raster image into pen-plotter turtle commands.
#[derive(Parser)]
#[command(name = "turtlepen", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Gaussian blur sigma (0 disables blurring).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Number of 3x3 dilation passes over the edge map.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_DILATE_ITERATIONS)]
    dilate_iterations: u32,

    /// Invert the edge map before compiling.
    #[arg(long)]
    invert: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other filter flags are ignored. Missing fields
    /// take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Treat the input as a binary mask and skip the filter chain.
    #[arg(long)]
    mask: bool,

    /// Red level at or above which a mask pixel is foreground (with `--mask`).
    #[arg(long, default_value_t = 255, requires = "mask")]
    threshold: u8,

    /// Write the turtle JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the turtle JSON.
    #[arg(long)]
    pretty: bool,

    /// Also write an SVG preview to this path.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Overlay pen-up travel in the SVG preview.
    #[arg(long, requires = "svg")]
    show_travel: bool,

    /// Print a per-stage diagnostics report to stderr.
    #[arg(long, conflicts_with = "json_report")]
    report: bool,

    /// Print diagnostics as JSON to stderr.
    #[arg(long)]
    json_report: bool,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual filter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("cannot parse --config-json: {e}"));
    }

    Ok(PipelineConfig {
        blur_sigma: cli.blur_sigma,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        dilate_iterations: cli.dilate_iterations,
        invert: cli.invert,
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let image_bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("cannot read {}: {e}", cli.image_path.display()))?;
    info!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "read input image"
    );

    let program = if cli.mask {
        if cli.report || cli.json_report {
            warn!("diagnostics are only collected for the filter pipeline; ignoring report flags");
        }
        turtlepen_pipeline::process_mask(&image_bytes, cli.threshold)
            .map_err(|e| format!("pipeline error: {e}"))?
    } else {
        let config = config_from_cli(cli)?;
        let (program, diagnostics) =
            turtlepen_pipeline::diagnostics::process_with_diagnostics(
                &image_bytes,
                &config,
                &StdClock,
            )
            .map_err(|e| format!("pipeline error: {e}"))?;
        print_diagnostics(cli, &diagnostics)?;
        program
    };

    let counts = program.counts();
    info!(
        width = program.dimensions.width,
        height = program.dimensions.height,
        commands = program.commands.len(),
        islands = counts.pen_downs,
        travel = counts.travel_units,
        "compiled program"
    );

    write_turtle_json(cli, &program)?;
    if let Some(ref svg_path) = cli.svg {
        write_svg(cli, svg_path, &program)?;
    }
    Ok(())
}

fn print_diagnostics(cli: &Cli, diagnostics: &PipelineDiagnostics) -> Result<(), String> {
    if cli.json_report {
        let json = serde_json::to_string_pretty(diagnostics)
            .map_err(|e| format!("cannot serialize diagnostics: {e}"))?;
        eprintln!("{json}");
    } else if cli.report {
        eprintln!("{}", diagnostics.report());
    }
    Ok(())
}

fn write_turtle_json(cli: &Cli, program: &Program) -> Result<(), String> {
    let json = if cli.pretty {
        turtlepen_export::to_turtle_json_pretty(program)
    } else {
        turtlepen_export::to_turtle_json(program)
    }
    .map_err(|e| format!("export error: {e}"))?;

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, format!("{json}\n"))
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            info!(path = %path.display(), bytes = json.len(), "turtle JSON written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn write_svg(cli: &Cli, svg_path: &Path, program: &Program) -> Result<(), String> {
    let title = cli
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("turtlepen");
    let desc = format!("{} turtle commands", program.commands.len());
    let metadata = turtlepen_export::SvgMetadata {
        title: Some(title),
        description: Some(&desc),
        show_travel: cli.show_travel,
    };
    let svg = turtlepen_export::to_svg(program, &metadata)
        .map_err(|e| format!("export error: {e}"))?;
    std::fs::write(svg_path, &svg)
        .map_err(|e| format!("cannot write {}: {e}", svg_path.display()))?;
    info!(path = %svg_path.display(), bytes = svg.len(), "SVG preview written");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
