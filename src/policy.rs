use std::fmt;

use ndarray::Array2;

use crate::action::Action;
use crate::error::OutOfBoundsError;
use crate::grid::{GridWorld, Position};
use crate::movement::MovementModel;
use crate::transition::{best_action, expected_utility};
use crate::utility::UtilityTable;

/// Greedy action per cell. Walls and terminals never carry an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub actions: Array2<Option<Action>>,
    /// Derived from a converged utility table.
    pub is_optimal: bool,
}

impl Policy {
    /// A policy with no entries.
    pub fn new(grid: &GridWorld) -> Policy {
        Policy {
            actions: Array2::from_elem((grid.height(), grid.width()), None),
            is_optimal: false,
        }
    }

    /// Greedy policy for `utilities`. The discount scales every action's
    /// value equally and leaves the argmax unchanged; it is accepted so the
    /// call matches [`q_values`].
    pub fn extract(
        utilities: &UtilityTable,
        grid: &GridWorld,
        movement: &MovementModel,
        _discount: f64,
    ) -> Policy {
        let mut policy = Policy::new(grid);
        for cell in grid.cells() {
            if !cell.accessible || cell.is_wall() || cell.is_terminal() {
                continue;
            }
            let (action, _) = best_action(grid, movement, utilities, cell.position);
            policy.actions[[cell.position.row - 1, cell.position.col - 1]] = Some(action);
        }
        policy.is_optimal = utilities.has_converged();
        policy
    }

    pub fn action_at(&self, position: Position) -> Option<Action> {
        if position.row == 0 || position.col == 0 {
            return None;
        }
        self.actions.get([position.row - 1, position.col - 1]).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.actions.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Full action values `R(s) + gamma * E[U(s')]` for one cell, in action
/// enumeration order.
pub fn q_values(
    utilities: &UtilityTable,
    grid: &GridWorld,
    movement: &MovementModel,
    discount: f64,
    position: Position,
) -> Result<[(Action, f64); 4], OutOfBoundsError> {
    let cell = grid.cell_at(position)?;
    Ok(Action::ALL.map(|a| {
        (a, cell.reward + discount * expected_utility(grid, movement, utilities, position, a))
    }))
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (height, width) = self.actions.dim();
        for row in (0..height).rev() {
            write!(f, "row {:>3} |", row + 1)?;
            for col in 0..width {
                let mark = self.actions[[row, col]].map_or('.', Action::arrow);
                write!(f, " {mark}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
