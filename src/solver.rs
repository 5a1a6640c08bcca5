//! Value iteration over the grid world.
//!
//! Each call to [`step`] applies one synchronous Bellman optimality update:
//!
//! `U'(s) = R(s) + gamma * max_a sum_s' P(s' | s, a) U(s')`
//!
//! with every read taken from the incoming table, never from values written
//! during the same sweep.

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::grid::GridWorld;
use crate::movement::MovementModel;
use crate::transition::best_action;
use crate::utility::UtilityTable;

/// One Bellman sweep. Returns a new table shaped by `grid`; `utilities`
/// becomes its `previous` values. Reads go through
/// [`UtilityTable::value_at`], so cells the incoming table does not cover
/// count as 0.
pub fn step(
    utilities: &UtilityTable,
    grid: &GridWorld,
    movement: &MovementModel,
    discount: f64,
) -> UtilityTable {
    let mut values = Array2::<f64>::zeros((grid.height(), grid.width()));
    let mut delta_max: f64 = 0.0;

    for cell in grid.cells() {
        let ix = [cell.position.row - 1, cell.position.col - 1];
        if cell.is_wall() || !cell.accessible {
            continue;
        }
        if cell.is_terminal() {
            values[ix] = cell.reward;
            continue;
        }
        let (_, expected) = best_action(grid, movement, utilities, cell.position);
        let updated = cell.reward + discount * expected;
        delta_max = delta_max.max((updated - utilities.value_at(cell.position)).abs());
        values[ix] = updated;
    }

    let iteration_count = utilities.iteration_count + 1;
    let has_converged = delta_max < utilities.threshold;
    debug!(iteration = iteration_count, delta_max, has_converged, "value iteration step");

    UtilityTable {
        previous: utilities.values.clone(),
        values,
        iteration_count,
        delta_max,
        has_converged,
        threshold: utilities.threshold,
    }
}

/// Step until converged or `max_iterations` sweeps have been applied in
/// this call.
pub fn run_to_convergence(
    utilities: &UtilityTable,
    grid: &GridWorld,
    movement: &MovementModel,
    discount: f64,
    max_iterations: u64,
) -> UtilityTable {
    let mut current = utilities.clone();
    for _ in 0..max_iterations {
        current = step(&current, grid, movement, discount);
        if current.has_converged {
            info!(iterations = current.iteration_count, delta_max = current.delta_max, "value iteration converged");
            return current;
        }
    }
    warn!(max_iterations, delta_max = current.delta_max, "value iteration did not converge");
    current
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Position, TerminalState};
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn classic() -> (GridWorld, MovementModel) {
        (GridWorld::classic(-0.04).unwrap(), MovementModel::default())
    }

    #[test]
    fn first_step_values() {
        // Arrange
        let (grid, m) = classic();
        let table = UtilityTable::new(&grid);
        // Act
        let next = step(&table, &grid, &m, 1.0);
        // Assert
        assert_abs_diff_eq!(next.value_at(Position::new(3, 3)), 0.76, epsilon = 1e-12);
        assert_abs_diff_eq!(next.value_at(Position::new(1, 1)), -0.04, epsilon = 1e-12);
        assert_eq!(next.value_at(Position::new(3, 4)), 1.0);
        assert_eq!(next.value_at(Position::new(2, 4)), -1.0);
        assert_eq!(next.value_at(Position::new(2, 2)), 0.0);
        assert_eq!(next.iteration_count(), 1);
        assert_abs_diff_eq!(next.delta_max(), 0.76, epsilon = 1e-12);
        assert!(!next.has_converged());
    }

    #[test]
    fn previous_values_are_input_values() {
        let (grid, m) = classic();
        let table = UtilityTable::new(&grid);
        let one = step(&table, &grid, &m, 1.0);
        let two = step(&one, &grid, &m, 1.0);
        assert_eq!(two.previous_value_at(Position::new(3, 3)), one.value_at(Position::new(3, 3)));
        assert_eq!(two.iteration_count(), 2);
    }

    #[test]
    fn update_is_synchronous() {
        // (3,2) only sees (3,3)'s value from the previous sweep, so after one
        // step it has not yet picked up anything from the goal.
        let (grid, m) = classic();
        let next = step(&UtilityTable::new(&grid), &grid, &m, 1.0);
        assert_abs_diff_eq!(next.value_at(Position::new(3, 2)), -0.04, epsilon = 1e-12);
    }

    #[test_case(1.0; "Undiscounted")]
    #[test_case(0.9; "Discounted")]
    #[test_case(0.5; "Heavily discounted")]
    fn converges_on_classic_grid(discount: f64) {
        let (grid, m) = classic();
        let done = run_to_convergence(&UtilityTable::new(&grid), &grid, &m, discount, 1000);
        assert!(done.has_converged());
        assert!(done.iteration_count() <= 1000);
    }

    #[test]
    fn converged_values_match_textbook() {
        let (grid, m) = classic();
        let done = run_to_convergence(&UtilityTable::new(&grid), &grid, &m, 1.0, 1000);
        assert_abs_diff_eq!(done.value_at(Position::new(1, 1)), 0.705, epsilon = 0.01);
        assert_abs_diff_eq!(done.value_at(Position::new(3, 3)), 0.918, epsilon = 0.01);
        assert_abs_diff_eq!(done.value_at(Position::new(2, 3)), 0.660, epsilon = 0.01);
    }

    #[test]
    fn iteration_counts_after_convergence() {
        let (grid, m) = classic();
        let done = run_to_convergence(&UtilityTable::new(&grid), &grid, &m, 0.9, 1000);
        let again = step(&done, &grid, &m, 0.9);
        assert_eq!(again.iteration_count(), done.iteration_count() + 1);
        assert!(again.has_converged());
        assert_abs_diff_eq!(again.values(), done.values(), epsilon = 0.001);
    }

    #[test]
    fn table_from_other_grid_is_reshaped() {
        // Arrange
        let (small, m) = classic();
        let large = GridWorld::build(
            5, 5,
            &[],
            &[TerminalState::new(Position::new(5, 5), 1.0)],
            Some(Position::new(1, 1)),
            -0.04,
        ).unwrap();
        let table = UtilityTable::new(&small);
        // Act
        let next = step(&table, &large, &m, 1.0);
        // Assert
        assert_eq!(next.values().dim(), (5, 5));
        assert_eq!(next.value_at(Position::new(5, 5)), 1.0);
        assert_abs_diff_eq!(next.value_at(Position::new(4, 5)), 0.76, epsilon = 1e-12);
        assert_eq!(next.iteration_count(), 1);
        let back = step(&next, &small, &m, 1.0);
        assert_eq!(back.values().dim(), (3, 4));
        assert_eq!(back.value_at(Position::new(3, 4)), 1.0);
    }

    #[test]
    fn zero_discount_gives_immediate_rewards() {
        let (grid, m) = classic();
        let next = step(&UtilityTable::new(&grid), &grid, &m, 0.0);
        for cell in grid.cells().filter(|c| !c.is_wall() && !c.is_terminal()) {
            assert_eq!(next.value_at(cell.position), cell.reward);
        }
    }
}
