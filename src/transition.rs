//! Stochastic transitions with "stay on collision".
//!
//! Every action from every state has a complete three-outcome distribution:
//! a blocked outcome does not make the action illegal, it leaves the agent
//! where it is. Outcomes that collapse onto the same cell are not merged;
//! their weighted lookups are simply summed.

use crate::action::Action;
use crate::grid::{GridWorld, Position};
use crate::movement::{MovementModel, Slip};
use crate::utility::UtilityTable;

/// Destination of a single deterministic move. Falls back to `from` when the
/// move leaves the grid or hits a wall.
pub fn next_state_for(grid: &GridWorld, from: Position, action: Action) -> Position {
    let (d_row, d_col) = action.displacement();
    match from.offset(d_row, d_col) {
        Some(to) if grid.is_accessible(to) => to,
        _ => from,
    }
}

/// The (destination, probability) triple for taking `action` in `from`,
/// ordered intended, left-turn, right-turn.
pub fn outcomes(
    grid: &GridWorld, movement: &MovementModel, from: Position, action: Action,
) -> [(Position, f64); 3] {
    Slip::ALL.map(|slip| {
        (next_state_for(grid, from, slip.apply(action)), movement.probability(slip))
    })
}

/// Probability-weighted successor utility of `action` in `from`.
pub fn expected_utility(
    grid: &GridWorld,
    movement: &MovementModel,
    utilities: &UtilityTable,
    from: Position,
    action: Action,
) -> f64 {
    outcomes(grid, movement, from, action)
        .iter()
        .map(|(to, p)| p * utilities.value_at(*to))
        .sum()
}

/// First action in enumeration order reaching the maximum expected utility.
pub fn best_action(
    grid: &GridWorld,
    movement: &MovementModel,
    utilities: &UtilityTable,
    from: Position,
) -> (Action, f64) {
    let mut best = (Action::ALL[0], f64::NEG_INFINITY);
    for a in Action::ALL {
        let value = expected_utility(grid, movement, utilities, from, a);
        if value > best.1 {
            best = (a, value);
        }
    }
    best
}
