//! turtlepen-pipeline: raster-to-turtle-command compiler (sans-IO).
//!
//! Compiles a binary mask into an ordered stream of pen-plotter turtle
//! commands that retrace every foreground region using unit moves along
//! the four cardinal directions:
//!
//! mask -> islands (4-connected regions) -> greedy tour ->
//! per-step path compilation -> command program.
//!
//! An optional filter front-end ([`filter`]) turns photos into masks
//! (grayscale -> blur -> Canny -> dilate -> invert).
//!
//! This crate has **no I/O dependencies**: it operates on in-memory byte
//! slices and images and returns structured data. Serialization to the
//! turtle JSON document and SVG previews lives in `turtlepen-export`.

pub mod assemble;
pub mod diagnostics;
pub mod filter;
pub mod islands;
pub mod mask;
pub mod path;
pub mod replay;
pub mod tour;
pub mod types;

pub use assemble::{compile, compile_islands};
pub use mask::BinaryMask;
pub use replay::{MAX_MOVE_UNITS, ReplayError, Trace, replay, replay_within};
pub use types::{
    Command, CommandCounts, Dimensions, Heading, Island, ParseCommandError, Pen, PipelineConfig,
    PipelineError, Pixel, PlotterState, Program,
};

/// Run the full pipeline: image bytes in, turtle program out.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP), filters them into an
/// edge mask according to `config`, and compiles the mask.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::ZeroDimensions`] for a zero-sized image.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<Program, PipelineError> {
    config.validate()?;
    let gray = filter::decode_grayscale(image_bytes)?;
    let edges = filter::edge_mask(&gray, config)?;
    let mask = BinaryMask::from_gray(&edges)?;
    Ok(compile(&mask))
}

/// Compile an image that is already a binary mask, skipping the filters.
///
/// Pixels whose red channel is at least `level` are foreground, so with
/// the default of 255 both white and pure red count as ink.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::ZeroDimensions`] for a zero-sized image.
pub fn process_mask(image_bytes: &[u8], level: u8) -> Result<Program, PipelineError> {
    let red = filter::decode_red_channel(image_bytes)?;
    let mask = BinaryMask::threshold(&red, level)?;
    Ok(compile(&mask))
}
