use crate::isoline::rectangle::{CellCase, Quadrant, ValueRectangle};
use crate::isoline::side::Side;

/// Maximum number of nested subdivisions of a saddle window.
pub(crate) const MAX_SADDLE_DEPTH: u32 = 100;

// An isoline visits each quadrant at most twice.
const MAX_QUADRANT_STEPS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SaddleError {
    /// Subdivision depth exceeded.
    TooDeep(u32),
    /// The isoline could not be followed through the quadrants.
    NoExit,
}

/// Finds the side through which an isoline entering a saddle window through `enter` leaves it.
///
/// The window is split into four quadrants with interpolated values at the side midpoints and at the centre. The
/// isoline is followed through the quadrants until it crosses the border of the window. Quadrants that are saddles
/// themselves are resolved recursively, `depth` being the current nesting level.
pub(crate) fn resolve_saddle(
    rect: &ValueRectangle,
    enter: Side,
    level: f64,
    depth: u32,
) -> Result<Side, SaddleError> {
    if depth > MAX_SADDLE_DEPTH {
        return Err(SaddleError::TooDeep(depth));
    }

    let quadrants = rect.split(level);
    let Some(mut quadrant) = Quadrant::on_side(enter)
        .into_iter()
        .find(|q| quadrants[*q as usize].is_crossed(enter, level))
    else {
        return Err(SaddleError::NoExit);
    };

    let mut side = enter;
    for _ in 0..MAX_QUADRANT_STEPS {
        let current = &quadrants[quadrant as usize];
        let exit = match current.case(level) {
            CellCase::Saddle => resolve_saddle(current, side, level, depth + 1)?,
            case => case.pass_exit(side).ok_or(SaddleError::NoExit)?,
        };

        match quadrant.neighbour(exit) {
            Some(next) => {
                quadrant = next;
                side = exit.opposite();
            }
            None => return Ok(exit),
        }
    }

    Err(SaddleError::NoExit)
}
