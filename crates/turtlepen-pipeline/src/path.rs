//! Path compilation: turn a walk between two pixels into turtle commands.
//!
//! The plotter only moves in unit steps along the four cardinal
//! directions. Every step re-evaluates which axis still has the larger
//! remaining distance and turns to face along it:
//!
//! - `|dx| > |dy|` moves along x, otherwise along y, so vertical movement
//!   wins ties;
//! - the turn needed is `(target - heading + 360) mod 360`: 0 emits
//!   nothing, 180 emits the half-turn, below 180 turns clockwise by that
//!   amount, above 180 turns counter-clockwise by `360 - diff`.
//!
//! Because dominance is recomputed per step, once `|dx| == |dy|` the path
//! alternates axes every step and zig-zags diagonally toward the target.

use crate::types::{Command, Heading, Pixel, PlotterState};

/// Heading that reduces the larger remaining delta.
///
/// Ties (`|dx| == |dy|`) go to the y axis.
#[must_use]
pub const fn dominant_heading(dx: i64, dy: i64) -> Heading {
    if dx.abs() > dy.abs() {
        if dx > 0 {
            Heading::PositiveX
        } else {
            Heading::NegativeX
        }
    } else if dy > 0 {
        Heading::PositiveY
    } else {
        Heading::NegativeY
    }
}

/// Rotation that turns `from` to face `to`, or `None` if no turn is needed.
///
/// The result is a [`Command::Rotate`] angle: positive for clockwise,
/// negative for counter-clockwise, and [`Command::HALF_TURN`] for an
/// about-face.
#[must_use]
pub const fn rotation_between(from: Heading, to: Heading) -> Option<i16> {
    // Both degrees are < 360, so the sum stays well inside i16.
    #[allow(clippy::cast_possible_wrap)]
    let diff = (to.degrees() as i16 - from.degrees() as i16 + 360) % 360;
    match diff {
        0 => None,
        180 => Some(Command::HALF_TURN),
        d if d < 180 => Some(d),
        d => Some(-(360 - d)),
    }
}

/// Walk from `state.position` to `target`, appending commands to `out`.
///
/// Emits exactly `|dx| + |dy|` single-unit [`Command::Move`]s, each
/// preceded by a [`Command::Rotate`] when the heading changes. Pen state
/// is left untouched. Returns the state at `target` with the heading of
/// the last step (or the original heading if no step was taken).
pub fn compile_path(state: PlotterState, target: Pixel, out: &mut Vec<Command>) -> PlotterState {
    let mut position = state.position;
    let mut heading = state.heading;

    loop {
        let dx = i64::from(target.x) - i64::from(position.x);
        let dy = i64::from(target.y) - i64::from(position.y);
        if dx == 0 && dy == 0 {
            break;
        }

        let next = dominant_heading(dx, dy);
        if let Some(degrees) = rotation_between(heading, next) {
            out.push(Command::Rotate(degrees));
        }

        // The step always moves toward `target`, so it stays within the
        // range spanned by two valid `u32` coordinates.
        position = match next {
            Heading::PositiveX => Pixel::new(position.x + 1, position.y),
            Heading::NegativeX => Pixel::new(position.x - 1, position.y),
            Heading::PositiveY => Pixel::new(position.x, position.y + 1),
            Heading::NegativeY => Pixel::new(position.x, position.y - 1),
        };
        out.push(Command::Move(1));
        heading = next;
    }

    PlotterState {
        position,
        heading,
        pen: state.pen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u32, y: u32, heading: Heading) -> PlotterState {
        PlotterState {
            position: Pixel::new(x, y),
            heading,
            ..PlotterState::default()
        }
    }

    fn compile(state: PlotterState, target: Pixel) -> (Vec<Command>, PlotterState) {
        let mut out = Vec::new();
        let end = compile_path(state, target, &mut out);
        (out, end)
    }

    #[test]
    fn dominant_axis_prefers_larger_delta() {
        assert_eq!(dominant_heading(3, 1), Heading::PositiveX);
        assert_eq!(dominant_heading(-3, 1), Heading::NegativeX);
        assert_eq!(dominant_heading(1, 3), Heading::PositiveY);
        assert_eq!(dominant_heading(1, -3), Heading::NegativeY);
    }

    #[test]
    fn dominant_axis_tie_goes_to_y() {
        assert_eq!(dominant_heading(2, 2), Heading::PositiveY);
        assert_eq!(dominant_heading(-2, 2), Heading::PositiveY);
        assert_eq!(dominant_heading(2, -2), Heading::NegativeY);
        assert_eq!(dominant_heading(-2, -2), Heading::NegativeY);
    }

    #[test]
    fn rotation_law_for_all_heading_pairs() {
        for from in Heading::ALL {
            for to in Heading::ALL {
                let diff = (i32::from(to.degrees()) - i32::from(from.degrees()) + 360) % 360;
                let expected = match diff {
                    0 => None,
                    180 => Some(180),
                    d if d < 180 => Some(d),
                    d => Some(-(360 - d)),
                };
                assert_eq!(
                    rotation_between(from, to).map(i32::from),
                    expected,
                    "{from:?} -> {to:?}",
                );
            }
        }
    }

    #[test]
    fn rotation_examples() {
        use Heading::{NegativeX, NegativeY, PositiveX, PositiveY};
        assert_eq!(rotation_between(PositiveX, PositiveX), None);
        assert_eq!(rotation_between(PositiveX, PositiveY), Some(90));
        assert_eq!(rotation_between(PositiveX, NegativeY), Some(-90));
        assert_eq!(rotation_between(PositiveX, NegativeX), Some(180));
        assert_eq!(rotation_between(NegativeX, PositiveX), Some(180));
        assert_eq!(rotation_between(NegativeY, PositiveX), Some(90));
        assert_eq!(rotation_between(PositiveY, PositiveX), Some(-90));
    }

    #[test]
    fn same_point_emits_nothing() {
        let state = at(3, 3, Heading::NegativeY);
        let (commands, end) = compile(state, Pixel::new(3, 3));
        assert!(commands.is_empty());
        assert_eq!(end, state);
    }

    #[test]
    fn straight_ahead_needs_no_rotation() {
        let (commands, end) = compile(at(0, 0, Heading::PositiveX), Pixel::new(3, 0));
        assert_eq!(commands, vec![Command::Move(1); 3]);
        assert_eq!(end.position, Pixel::new(3, 0));
        assert_eq!(end.heading, Heading::PositiveX);
    }

    #[test]
    fn reverse_uses_half_turn() {
        let (commands, end) = compile(at(5, 0, Heading::PositiveX), Pixel::new(3, 0));
        assert_eq!(
            commands,
            vec![Command::Rotate(180), Command::Move(1), Command::Move(1)]
        );
        assert_eq!(end.heading, Heading::NegativeX);
    }

    #[test]
    fn upward_from_east_turns_counter_clockwise() {
        let (commands, end) = compile(at(0, 2, Heading::PositiveX), Pixel::new(0, 0));
        assert_eq!(
            commands,
            vec![Command::Rotate(-90), Command::Move(1), Command::Move(1)]
        );
        assert_eq!(end.heading, Heading::NegativeY);
    }

    #[test]
    fn walk_to_two_one_zig_zags_after_tie() {
        // |dx|=2 > |dy|=1: step +x. Then |dx|=|dy|=1: tie, step +y. Then +x.
        let (commands, end) = compile(at(0, 0, Heading::PositiveX), Pixel::new(2, 1));
        assert_eq!(
            commands,
            vec![
                Command::Move(1),
                Command::Rotate(90),
                Command::Move(1),
                Command::Rotate(-90),
                Command::Move(1),
            ]
        );
        assert_eq!(end.position, Pixel::new(2, 1));
        assert_eq!(end.heading, Heading::PositiveX);
    }

    #[test]
    fn diagonal_walk_alternates_every_step() {
        let (commands, _) = compile(at(0, 0, Heading::PositiveX), Pixel::new(2, 2));
        assert_eq!(
            commands,
            vec![
                Command::Rotate(90),
                Command::Move(1),
                Command::Rotate(-90),
                Command::Move(1),
                Command::Rotate(90),
                Command::Move(1),
                Command::Rotate(-90),
                Command::Move(1),
            ]
        );
    }

    #[test]
    fn pen_state_is_preserved() {
        let state = PlotterState {
            pen: crate::types::Pen::Down,
            ..at(0, 0, Heading::PositiveX)
        };
        let (_, end) = compile(state, Pixel::new(1, 4));
        assert_eq!(end.pen, crate::types::Pen::Down);
    }

    #[test]
    fn move_count_equals_manhattan_distance_and_lands_on_target() {
        let points = [(0, 0), (5, 0), (0, 5), (3, 7), (7, 3), (4, 4), (1, 6)];
        for &(sx, sy) in &points {
            for &(tx, ty) in &points {
                for heading in Heading::ALL {
                    let (commands, end) = compile(at(sx, sy, heading), Pixel::new(tx, ty));
                    let moves = commands
                        .iter()
                        .filter(|c| matches!(c, Command::Move(1)))
                        .count();
                    let rotations = commands
                        .iter()
                        .filter(|c| matches!(c, Command::Rotate(_)))
                        .count();
                    assert_eq!(moves as u32, sx.abs_diff(tx) + sy.abs_diff(ty));
                    assert_eq!(moves + rotations, commands.len());
                    assert_eq!(end.position, Pixel::new(tx, ty));
                }
            }
        }
    }

    #[test]
    fn never_two_rotations_in_a_row() {
        let (commands, _) = compile(at(9, 9, Heading::PositiveY), Pixel::new(0, 2));
        for pair in commands.windows(2) {
            assert!(
                !(matches!(pair[0], Command::Rotate(_)) && matches!(pair[1], Command::Rotate(_))),
                "consecutive rotations in {commands:?}",
            );
        }
    }
}
