//! Turtle JSON export.
//!
//! The turtle document is the interchange format consumed by turtle
//! drawing front-ends:
//!
//! ```json
//! {"size":[4,4],"data":["u","m1","r90","m1","l90","m1","d"]}
//! ```
//!
//! `size` is the canvas `[width, height]` in pixels and `data` the command
//! tokens in execution order (see [`Command`] for the token grammar).

use serde::{Deserialize, Serialize};
use turtlepen_pipeline::{Command, Dimensions, Program};

use crate::ExportError;

/// Serde model of a turtle document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurtleDocument {
    /// Canvas `[width, height]` in pixels.
    pub size: [u32; 2],
    /// Commands in execution order, serialized as tokens.
    pub data: Vec<Command>,
}

impl TurtleDocument {
    /// Build a document from a compiled program.
    #[must_use]
    pub fn from_program(program: &Program) -> Self {
        Self {
            size: [program.dimensions.width, program.dimensions.height],
            data: program.commands.clone(),
        }
    }

    /// Convert back into a [`Program`].
    #[must_use]
    pub fn into_program(self) -> Program {
        let [width, height] = self.size;
        Program {
            commands: self.data,
            dimensions: Dimensions { width, height },
        }
    }
}

/// Serialize a program as compact turtle JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_turtle_json(program: &Program) -> Result<String, ExportError> {
    Ok(serde_json::to_string(&TurtleDocument::from_program(program))?)
}

/// Serialize a program as indented turtle JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_turtle_json_pretty(program: &Program) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&TurtleDocument::from_program(
        program,
    ))?)
}

/// Parse a turtle document.
///
/// # Errors
///
/// Returns [`ExportError::Json`] for malformed JSON, a missing field, or
/// an unknown command token.
pub fn from_turtle_json(json: &str) -> Result<TurtleDocument, ExportError> {
    Ok(serde_json::from_str(json)?)
}
