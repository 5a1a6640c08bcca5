//! The run loop: owns the grid and the published snapshot, and composes
//! value iteration, policy extraction and the agent stepper.
//!
//! Snapshots are immutable and shared through `Arc`. A step builds a whole
//! new snapshot and swaps it in only when it is complete, so a reader
//! holding the previous one never sees a half-updated state.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::agent::{Agent, Move};
use crate::config::{validate_discount, SimulationConfig};
use crate::error::{ConfigurationError, Result};
use crate::grid::GridWorld;
use crate::movement::MovementModel;
use crate::policy::Policy;
use crate::solver;
use crate::utility::UtilityTable;

/// Everything the display layer reads after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub utilities: UtilityTable,
    pub policy: Policy,
    pub agent: Agent,
    pub last_move: Option<Move>,
}

impl Snapshot {
    pub fn has_converged(&self) -> bool {
        self.utilities.has_converged()
    }

    pub fn iteration_count(&self) -> u64 {
        self.utilities.iteration_count()
    }
}

/// Fresh utility table converging at `threshold`, empty policy and an agent
/// at the start cell.
pub fn reset(
    grid: &GridWorld,
    movement: MovementModel,
    threshold: f64,
) -> std::result::Result<(UtilityTable, Policy, Agent), ConfigurationError> {
    let utilities = UtilityTable::with_threshold(grid, threshold)?;
    Ok((utilities, Policy::new(grid), Agent::at_start(grid, movement)))
}

pub struct Simulation {
    config: SimulationConfig,
    grid: Arc<GridWorld>,
    movement: MovementModel,
    current: Arc<Snapshot>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Simulation> {
        config.validate_scalars()?;
        let grid = config.build_grid()?;
        let movement = config.movement_model()?;
        let current = Arc::new(Simulation::fresh(&grid, movement, config.convergence_threshold)?);
        Ok(Simulation { config, grid: Arc::new(grid), movement, current })
    }

    fn fresh(grid: &GridWorld, movement: MovementModel, threshold: f64) -> Result<Snapshot> {
        let (utilities, policy, agent) = reset(grid, movement, threshold)?;
        Ok(Snapshot { utilities, policy, agent, last_move: None })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Arc<GridWorld> {
        &self.grid
    }

    pub fn movement(&self) -> &MovementModel {
        &self.movement
    }

    /// The currently published state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// One iteration: Bellman sweep, greedy policy, one agent move. Nothing
    /// changes once the agent has reached a terminal.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Arc<Snapshot> {
        if self.current.agent.at_terminal {
            return self.snapshot();
        }
        let r = rng.gen::<f64>();
        self.step_with_sample(r)
    }

    /// [`Simulation::step`] with the agent's uniform sample supplied.
    pub fn step_with_sample(&mut self, r: f64) -> Arc<Snapshot> {
        let prev = &self.current;
        if prev.agent.at_terminal {
            return self.snapshot();
        }
        let discount = self.config.discount_factor;
        let utilities = solver::step(&prev.utilities, &self.grid, &self.movement, discount);
        let policy = Policy::extract(&utilities, &self.grid, &self.movement, discount);
        let (agent, mv) = prev.agent.step_with_sample(&policy, &self.grid, r);
        debug!(iteration = utilities.iteration_count(), position = %agent.position, "simulation step");
        self.publish(Snapshot { utilities, policy, agent, last_move: Some(mv) })
    }

    /// Value-iterate to convergence (bounded by `max_iterations`) and
    /// refresh the policy. The agent does not move.
    pub fn solve(&mut self) -> Arc<Snapshot> {
        let prev = &self.current;
        let discount = self.config.discount_factor;
        let utilities = solver::run_to_convergence(
            &prev.utilities,
            &self.grid,
            &self.movement,
            discount,
            self.config.max_iterations,
        );
        let policy = Policy::extract(&utilities, &self.grid, &self.movement, discount);
        let agent = prev.agent.clone();
        self.publish(Snapshot { utilities, policy, agent, last_move: None })
    }

    pub fn reset(&mut self) -> Result<Arc<Snapshot>> {
        let fresh = Simulation::fresh(&self.grid, self.movement, self.config.convergence_threshold)?;
        Ok(self.publish(fresh))
    }

    /// Rebuild the grid with a new step reward. The published snapshot is
    /// left alone if the reward is rejected.
    pub fn set_step_reward(&mut self, step_reward: f64) -> Result<()> {
        let config = SimulationConfig { step_reward, ..self.config.clone() };
        let grid = config.build_grid()?;
        self.grid = Arc::new(grid);
        self.config = config;
        Ok(())
    }

    pub fn set_discount_factor(&mut self, discount: f64) -> Result<()> {
        validate_discount(discount)?;
        self.config.discount_factor = discount;
        Ok(())
    }

    fn publish(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.current = Arc::new(snapshot);
        self.snapshot()
    }
}
