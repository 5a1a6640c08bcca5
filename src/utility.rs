use std::fmt;

use ndarray::Array2;

use crate::error::{ConfigurationError, OutOfBoundsError};
use crate::grid::{GridWorld, Position};

pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.001;

/// Utility estimates for every cell, plus the bookkeeping of the value
/// iteration that produced them.
///
/// Values are stored densely, indexed `[row - 1, col - 1]`. Wall entries are
/// always 0 and terminal entries always hold the terminal reward; a fresh
/// table has every other entry at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityTable {
    pub(crate) values: Array2<f64>,
    pub(crate) previous: Array2<f64>,
    pub(crate) iteration_count: u64,
    pub(crate) delta_max: f64,
    pub(crate) has_converged: bool,
    pub(crate) threshold: f64,
}

impl UtilityTable {
    pub fn new(grid: &GridWorld) -> UtilityTable {
        let mut values = Array2::<f64>::zeros((grid.height(), grid.width()));
        for t in grid.terminals() {
            values[[t.position.row - 1, t.position.col - 1]] = t.reward;
        }
        UtilityTable {
            previous: values.clone(),
            values,
            iteration_count: 0,
            delta_max: 0.0,
            has_converged: false,
            threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(grid: &GridWorld, threshold: f64) -> Result<UtilityTable, ConfigurationError> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ConfigurationError::Threshold(threshold));
        }
        let mut table = UtilityTable::new(grid);
        table.threshold = threshold;
        Ok(table)
    }

    fn index(&self, position: Position) -> Option<[usize; 2]> {
        let (height, width) = self.values.dim();
        if (1..=height).contains(&position.row) && (1..=width).contains(&position.col) {
            Some([position.row - 1, position.col - 1])
        } else {
            None
        }
    }

    /// Current utility, or 0 for a position the table does not cover.
    pub fn value_at(&self, position: Position) -> f64 {
        self.index(position).map_or(0.0, |ix| self.values[ix])
    }

    pub fn utility(&self, position: Position) -> Result<f64, OutOfBoundsError> {
        let (height, width) = self.values.dim();
        self.index(position)
            .map(|ix| self.values[ix])
            .ok_or(OutOfBoundsError { position, width, height })
    }

    /// Utility before the most recent iteration.
    pub fn previous_value_at(&self, position: Position) -> f64 {
        self.index(position).map_or(0.0, |ix| self.previous[ix])
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    /// Largest absolute change made by the most recent iteration.
    pub fn delta_max(&self) -> f64 {
        self.delta_max
    }

    pub fn has_converged(&self) -> bool {
        self.has_converged
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl fmt::Display for UtilityTable {
    /// Top row first, so the table reads like the grid.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (height, width) = self.values.dim();
        write!(f, "    col:")?;
        for col in 1..=width {
            write!(f, "{:>9}", col)?;
        }
        writeln!(f)?;
        for row in (0..height).rev() {
            write!(f, "row {:>3} |", row + 1)?;
            for col in 0..width {
                write!(f, "{:>9.3}", self.values[[row, col]])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
