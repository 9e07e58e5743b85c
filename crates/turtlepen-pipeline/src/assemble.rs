//! Command assembly: drive the tour and the path compiler over every
//! island to produce the final [`Program`].
//!
//! The plotter starts at the origin facing +x with the pen up. For each
//! island in tour order it lifts the pen, travels to the island's entry
//! pixel, lowers the pen, then walks through the island's pixels in
//! stored order. No pen-up is emitted after the last island.

use crate::islands;
use crate::mask::BinaryMask;
use crate::path::compile_path;
use crate::tour::{IslandPool, Tour};
use crate::types::{Command, Dimensions, Island, Pen, PlotterState, Program};

/// Compile a mask into a turtle program.
///
/// An all-background mask yields an empty command list.
#[must_use = "returns the compiled program"]
pub fn compile(mask: &BinaryMask) -> Program {
    compile_islands(islands::find_islands(mask), mask.dimensions())
}

/// Compile already-extracted islands into a turtle program.
///
/// `islands` must be in extraction order for the tour's tie-break to be
/// reproducible.
#[must_use = "returns the compiled program"]
pub fn compile_islands(islands: Vec<Island>, dimensions: Dimensions) -> Program {
    let mut commands = Vec::new();
    let mut state = PlotterState::default();

    for island in Tour::new(IslandPool::new(islands), state.position) {
        state = draw_island(state, &island, &mut commands);
    }

    tracing::debug!(
        width = dimensions.width,
        height = dimensions.height,
        commands = commands.len(),
        "program assembled"
    );

    Program {
        commands,
        dimensions,
    }
}

/// Travel to `island` with the pen up, then trace it with the pen down.
///
/// Returns the plotter state at the island's last pixel.
fn draw_island(state: PlotterState, island: &Island, out: &mut Vec<Command>) -> PlotterState {
    let pixels = island.pixels();
    let Some(&entry) = pixels.first() else {
        return state;
    };

    out.push(Command::PenUp);
    let state = compile_path(
        PlotterState {
            pen: Pen::Up,
            ..state
        },
        entry,
        out,
    );

    out.push(Command::PenDown);
    let state = PlotterState {
        pen: Pen::Down,
        ..state
    };

    pixels
        .iter()
        .skip(1)
        .fold(state, |state, &pixel| compile_path(state, pixel, out))
}
