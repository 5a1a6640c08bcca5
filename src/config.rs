use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::{ConfigurationError, Result};
use crate::grid::{GridWorld, Position, TerminalState};
use crate::movement::MovementModel;
use crate::utility::DEFAULT_CONVERGENCE_THRESHOLD;

/// Hold information read from a TOML configuration file. Every field
/// defaults to the classic 4x3 world.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub step_reward: f64,
    pub discount_factor: f64,
    pub convergence_threshold: f64,
    pub max_iterations: u64,
    pub movement: MovementConfig,
    pub grid: GridConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    pub intended: f64,
    pub left_turn: f64,
    pub right_turn: f64,
    pub stay: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub start: Option<Position>,
    pub walls: Vec<Position>,
    pub terminals: Vec<TerminalState>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            step_reward: -0.04,
            discount_factor: 1.0,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: 1000,
            movement: MovementConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        let m = MovementModel::default();
        MovementConfig {
            intended: m.intended(),
            left_turn: m.left_turn(),
            right_turn: m.right_turn(),
            stay: m.stay(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width: 4,
            height: 3,
            start: Some(Position::new(1, 1)),
            walls: vec![Position::new(2, 2)],
            terminals: vec![
                TerminalState::new(Position::new(3, 4), 1.0),
                TerminalState::new(Position::new(2, 4), -1.0),
            ],
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> std::result::Result<SimulationConfig, ConfigurationError> {
        SimulationConfig::from_config_file(path).map_err(|e| ConfigurationError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn build_grid(&self) -> std::result::Result<GridWorld, ConfigurationError> {
        GridWorld::build(
            self.grid.width,
            self.grid.height,
            &self.grid.walls,
            &self.grid.terminals,
            self.grid.start,
            self.step_reward,
        )
    }

    pub fn movement_model(&self) -> Result<MovementModel> {
        let m = &self.movement;
        Ok(MovementModel::new(m.intended, m.left_turn, m.right_turn, m.stay)?)
    }

    /// Check every scalar setting. Grid layout and movement probabilities
    /// are checked when they are built.
    pub fn validate_scalars(&self) -> std::result::Result<(), ConfigurationError> {
        validate_discount(self.discount_factor)?;
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold > 0.0) {
            return Err(ConfigurationError::Threshold(self.convergence_threshold));
        }
        Ok(())
    }
}

pub fn validate_discount(discount: f64) -> std::result::Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&discount) {
        return Err(ConfigurationError::Discount(discount));
    }
    Ok(())
}
