//! Reference turtle interpreter.
//!
//! Executes a command stream the way a plotter would and records where
//! ink lands. The SVG preview draws from this, and tests use it to check
//! that compiled programs actually cover the mask.

use std::collections::HashSet;

use crate::types::{Command, Dimensions, Heading, Pen};

/// A lattice point reached by the turtle.
///
/// Signed, since an arbitrary command stream can walk off the canvas.
pub type Point = (i64, i64);

/// Errors raised while interpreting a command stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// A rotation was not a multiple of 90 degrees.
    #[error("command {index}: rotation by {degrees} degrees is not a multiple of 90")]
    UnalignedRotation {
        /// Position of the command in the stream.
        index: usize,
        /// The offending angle.
        degrees: i16,
    },

    /// A single move is longer than [`MAX_MOVE_UNITS`].
    #[error("command {index}: move of {units} units exceeds the limit of {limit}", limit = MAX_MOVE_UNITS)]
    MoveTooLong {
        /// Position of the command in the stream.
        index: usize,
        /// Requested distance.
        units: u32,
    },

    /// A step left the canvas given to [`replay_within`].
    #[error("command {index}: turtle left the canvas at ({}, {})", .position.0, .position.1)]
    OffCanvas {
        /// Position of the command in the stream.
        index: usize,
        /// First lattice point outside the canvas.
        position: Point,
    },
}

/// Longest single move [`replay`] accepts.
pub const MAX_MOVE_UNITS: u32 = 1 << 16;

/// Turtle position, heading, and pen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turtle {
    /// Current lattice position.
    pub position: Point,
    /// Current heading.
    pub heading: Heading,
    /// Current pen state.
    pub pen: Pen,
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

impl Turtle {
    /// A turtle at the origin facing +x with the pen up.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: (0, 0),
            heading: Heading::PositiveX,
            pen: Pen::Up,
        }
    }

    /// Rotate by `degrees` (clockwise positive).
    ///
    /// Returns `None` and leaves the heading unchanged if the angle is
    /// not a multiple of 90.
    #[must_use]
    pub fn rotated(self, degrees: i16) -> Option<Self> {
        let heading =
            Heading::from_degrees(i32::from(self.heading.degrees()) + i32::from(degrees))?;
        Some(Self { heading, ..self })
    }

    /// The position one unit step ahead.
    #[must_use]
    pub const fn step_ahead(&self) -> Point {
        let (dx, dy) = self.heading.unit_step();
        (self.position.0 + dx, self.position.1 + dy)
    }
}

/// Result of replaying a command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Turtle state after the last command.
    pub turtle: Turtle,
    /// Pen-down strokes in drawing order. Each stroke starts at the point
    /// where the pen went down and lists every lattice point visited,
    /// including repeats.
    pub strokes: Vec<Vec<Point>>,
    /// Pen-up travel legs, in the same shape as `strokes`.
    pub travel: Vec<Vec<Point>>,
}

impl Trace {
    /// Every lattice point touched while the pen was down.
    #[must_use]
    pub fn inked_points(&self) -> HashSet<Point> {
        self.strokes.iter().flatten().copied().collect()
    }
}

/// Run a whole command stream from a fresh [`Turtle`].
///
/// The turtle may wander anywhere on the signed lattice.
///
/// # Errors
///
/// Returns [`ReplayError::UnalignedRotation`] for a rotation that is not a
/// multiple of 90 degrees and [`ReplayError::MoveTooLong`] for a move
/// longer than [`MAX_MOVE_UNITS`].
pub fn replay(commands: &[Command]) -> Result<Trace, ReplayError> {
    run(commands, None)
}

/// Like [`replay`], but every visited point must lie on a
/// `bounds.width` × `bounds.height` canvas.
/// Compiled programs always pass.
///
/// # Errors
///
/// As [`replay`], plus [`ReplayError::OffCanvas`] at the first step
/// outside the canvas.
pub fn replay_within(commands: &[Command], bounds: Dimensions) -> Result<Trace, ReplayError> {
    run(commands, Some(bounds))
}

fn on_canvas((x, y): Point, bounds: Dimensions) -> bool {
    (0..i64::from(bounds.width)).contains(&x) && (0..i64::from(bounds.height)).contains(&y)
}

fn run(commands: &[Command], bounds: Option<Dimensions>) -> Result<Trace, ReplayError> {
    let mut turtle = Turtle::new();
    let mut strokes: Vec<Vec<Point>> = Vec::new();
    let mut travel: Vec<Vec<Point>> = vec![vec![turtle.position]];

    for (index, command) in commands.iter().enumerate() {
        match *command {
            Command::PenUp => {
                if turtle.pen == Pen::Down {
                    travel.push(vec![turtle.position]);
                }
                turtle.pen = Pen::Up;
            }
            Command::PenDown => {
                if turtle.pen == Pen::Up {
                    strokes.push(vec![turtle.position]);
                }
                turtle.pen = Pen::Down;
            }
            Command::Rotate(degrees) => {
                turtle = turtle
                    .rotated(degrees)
                    .ok_or(ReplayError::UnalignedRotation { index, degrees })?;
            }
            Command::Move(units) => {
                if units > MAX_MOVE_UNITS {
                    return Err(ReplayError::MoveTooLong { index, units });
                }
                let legs = match turtle.pen {
                    Pen::Down => &mut strokes,
                    Pen::Up => &mut travel,
                };
                for _ in 0..units {
                    turtle.position = turtle.step_ahead();
                    if let Some(bounds) = bounds
                        && !on_canvas(turtle.position, bounds)
                    {
                        return Err(ReplayError::OffCanvas {
                            index,
                            position: turtle.position,
                        });
                    }
                    if let Some(leg) = legs.last_mut() {
                        leg.push(turtle.position);
                    }
                }
            }
        }
    }

    travel.retain(|leg| leg.len() > 1);

    Ok(Trace {
        turtle,
        strokes,
        travel,
    })
}
