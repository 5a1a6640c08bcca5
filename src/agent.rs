use rand::Rng;
use tracing::info;

use crate::grid::{GridWorld, Position};
use crate::movement::{MovementModel, Slip};
use crate::policy::Policy;
use crate::transition::next_state_for;

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Position,
    pub movement: MovementModel,
    /// Latches once a terminal is reached.
    pub at_terminal: bool,
    pub step_count: u64,
}

/// What a single agent step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Already at a terminal; nothing happened and no step was counted.
    Halted,
    /// No policy entry for the current cell; the step was counted in place.
    Idle,
    Moved { slip: Slip, from: Position, to: Position },
}

impl Agent {
    pub fn new(start: Position, movement: MovementModel) -> Agent {
        Agent { position: start, movement, at_terminal: false, step_count: 0 }
    }

    pub fn at_start(grid: &GridWorld, movement: MovementModel) -> Agent {
        Agent::new(grid.start(), movement)
    }

    /// Advance one step, drawing the slip from `rng`.
    pub fn step<R: Rng>(&self, policy: &Policy, grid: &GridWorld, rng: &mut R) -> (Agent, Move) {
        if self.at_terminal {
            return (self.clone(), Move::Halted);
        }
        self.step_with_sample(policy, grid, rng.gen::<f64>())
    }

    /// Advance one step using the uniform sample `r` in [0, 1).
    pub fn step_with_sample(&self, policy: &Policy, grid: &GridWorld, r: f64) -> (Agent, Move) {
        if self.at_terminal {
            return (self.clone(), Move::Halted);
        }
        let mut next = self.clone();
        next.step_count += 1;

        let Some(action) = policy.action_at(self.position) else {
            return (next, Move::Idle);
        };
        let slip = self.movement.sample(r);
        let to = next_state_for(grid, self.position, slip.apply(action));
        next.position = to;
        next.at_terminal = grid.cell_at(to).is_ok_and(|cell| cell.is_terminal());
        if next.at_terminal {
            info!(position = %to, steps = next.step_count, "agent reached terminal");
        }
        (next, Move::Moved { slip, from: self.position, to })
    }
}
