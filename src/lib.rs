//! Value iteration on a small stochastic grid world.
//!
//! The engine is split the same way the problem is:
//!
//! - [`grid`] - cells, rewards, walls and terminal states
//! - [`action`] and [`movement`] - compass actions and the slip model
//! - [`transition`] - "stay on collision" successor states and expected utility
//! - [`solver`] - synchronous Bellman sweeps
//! - [`policy`] - greedy policy extraction
//! - [`agent`] - sampling the agent's actual move
//! - [`simulation`] - the run loop that owns and publishes the state
//!
//! ```
//! use gridvalue::{config::SimulationConfig, simulation::Simulation};
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! let snapshot = sim.solve();
//! assert!(snapshot.has_converged());
//! ```

pub mod action;
pub mod agent;
pub mod config;
pub mod error;
pub mod grid;
pub mod movement;
pub mod policy;
pub mod simulation;
pub mod solver;
pub mod transition;
pub mod utility;

pub use error::{Error, Result};
