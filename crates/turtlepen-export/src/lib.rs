//! turtlepen-export: pure format serializers (sans-IO).
//!
//! Converts compiled turtle programs into output formats: the turtle
//! JSON document consumed by drawing front-ends, and an SVG preview.

pub mod svg;
pub mod turtle;

pub use svg::{SvgMetadata, to_svg};
pub use turtle::{TurtleDocument, from_turtle_json, to_turtle_json, to_turtle_json_pretty};

/// Errors raised while exporting a program.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization or parsing failed.
    #[error("turtle JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The command stream could not be replayed for rendering.
    #[error("cannot replay program: {0}")]
    Replay(#[from] turtlepen_pipeline::ReplayError),
}
