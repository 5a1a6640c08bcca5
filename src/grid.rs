use std::collections::HashMap;
use std::fmt;
use std::iter::Iterator;

use serde::Deserialize;

use crate::error::{ConfigurationError, OutOfBoundsError};

/// Grid coordinate, 1-based. Row 1 is the bottom row.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Shift by a displacement. `None` when the result falls below row or
    /// column 1; upper bounds are the grid's business.
    pub fn offset(self, d_row: i64, d_col: i64) -> Option<Position> {
        let row = usize::try_from(self.row as i64 + d_row).ok()?;
        let col = usize::try_from(self.col as i64 + d_col).ok()?;
        if row == 0 || col == 0 {
            return None;
        }
        Some(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CellKind {
    Normal,
    Wall,
    Terminal,
    Start,
}

impl CellKind {
    pub fn name(self) -> &'static str {
        match self {
            CellKind::Normal => "normal",
            CellKind::Wall => "wall",
            CellKind::Terminal => "terminal",
            CellKind::Start => "start",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub position: Position,
    pub kind: CellKind,
    pub accessible: bool,
    pub reward: f64,
}

impl Cell {
    pub fn is_terminal(&self) -> bool {
        self.kind == CellKind::Terminal
    }

    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TerminalSign {
    Positive,
    Negative,
}

/// An absorbing cell and the reward collected on entering it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TerminalState {
    pub position: Position,
    pub reward: f64,
}

impl TerminalState {
    pub fn new(position: Position, reward: f64) -> TerminalState {
        TerminalState { position, reward }
    }

    pub fn sign(&self) -> TerminalSign {
        if self.reward < 0.0 {
            TerminalSign::Negative
        } else {
            TerminalSign::Positive
        }
    }
}


/// Row-major walk over every position of a `width` x `height` grid.
pub struct PositionIterator {
    row: usize,
    col: usize,
    width: usize,
    height: usize,
}

impl PositionIterator {
    pub fn new(width: usize, height: usize) -> PositionIterator {
        PositionIterator { row: 1, col: 1, width, height }
    }
}

impl Iterator for PositionIterator {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row > self.height || self.width == 0 {
            return None;
        }
        let position = Position::new(self.row, self.col);
        if self.col < self.width {
            self.col += 1;
        } else {
            self.col = 1;
            self.row += 1;
        }
        Some(position)
    }
}


/// Immutable description of the world: cells, rewards and terminal states.
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorld {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    start: Position,
    terminals: Vec<TerminalState>,
}

impl GridWorld {
    /// Lay out a grid. Normal and start cells earn `step_reward`, walls earn
    /// nothing and block movement, terminals earn their own reward.
    pub fn build(
        width: usize,
        height: usize,
        walls: &[Position],
        terminals: &[TerminalState],
        start: Option<Position>,
        step_reward: f64,
    ) -> Result<GridWorld, ConfigurationError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::EmptyGrid { width, height });
        }
        if !step_reward.is_finite() {
            return Err(ConfigurationError::NonFinite { name: "step reward", value: step_reward });
        }
        let start = start.ok_or(ConfigurationError::MissingStart)?;

        let mut claimed: HashMap<Position, CellKind> = HashMap::new();
        let mut claim = |kind: CellKind, position: Position| {
            if position.row == 0 || position.row > height || position.col == 0 || position.col > width {
                return Err(ConfigurationError::OutsideGrid { role: kind.name(), position, width, height });
            }
            if let Some(first) = claimed.insert(position, kind) {
                return Err(ConfigurationError::Overlap {
                    first: first.name(),
                    second: kind.name(),
                    position,
                });
            }
            Ok(())
        };
        for wall in walls {
            claim(CellKind::Wall, *wall)?;
        }
        for terminal in terminals {
            if !terminal.reward.is_finite() {
                return Err(ConfigurationError::NonFinite {
                    name: "terminal reward",
                    value: terminal.reward,
                });
            }
            claim(CellKind::Terminal, terminal.position)?;
        }
        claim(CellKind::Start, start)?;

        let cells = PositionIterator::new(width, height)
            .map(|position| {
                let kind = claimed.get(&position).copied().unwrap_or(CellKind::Normal);
                let reward = match kind {
                    CellKind::Wall => 0.0,
                    CellKind::Terminal => terminals
                        .iter()
                        .find(|t| t.position == position)
                        .map_or(0.0, |t| t.reward),
                    CellKind::Start | CellKind::Normal => step_reward,
                };
                Cell { position, kind, accessible: kind != CellKind::Wall, reward }
            })
            .collect();

        Ok(GridWorld { width, height, cells, start, terminals: terminals.to_vec() })
    }

    /// The 4x3 textbook world: wall at (2,2), +1 at (3,4), -1 at (2,4),
    /// start at (1,1).
    pub fn classic(step_reward: f64) -> Result<GridWorld, ConfigurationError> {
        GridWorld::build(
            4,
            3,
            &[Position::new(2, 2)],
            &[
                TerminalState::new(Position::new(3, 4), 1.0),
                TerminalState::new(Position::new(2, 4), -1.0),
            ],
            Some(Position::new(1, 1)),
            step_reward,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn terminals(&self) -> &[TerminalState] {
        &self.terminals
    }

    pub fn contains(&self, position: Position) -> bool {
        (1..=self.height).contains(&position.row) && (1..=self.width).contains(&position.col)
    }

    /// Zero-based (row, col) index into dense per-cell tables.
    pub fn index_of(&self, position: Position) -> Result<[usize; 2], OutOfBoundsError> {
        if !self.contains(position) {
            return Err(OutOfBoundsError { position, width: self.width, height: self.height });
        }
        Ok([position.row - 1, position.col - 1])
    }

    pub fn cell_at(&self, position: Position) -> Result<&Cell, OutOfBoundsError> {
        let [r, c] = self.index_of(position)?;
        Ok(&self.cells[r * self.width + c])
    }

    /// False outside the grid and on walls.
    pub fn is_accessible(&self, position: Position) -> bool {
        self.cell_at(position).is_ok_and(|cell| cell.accessible)
    }

    pub fn positions(&self) -> PositionIterator {
        PositionIterator::new(self.width, self.height)
    }

    /// Cells in row-major order, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (1..=self.height).rev() {
            write!(f, "{row:>3} |")?;
            for col in 1..=self.width {
                let cell = &self.cells[(row - 1) * self.width + col - 1];
                match cell.kind {
                    CellKind::Wall => write!(f, " {:>7}", "####")?,
                    CellKind::Terminal => write!(f, " {:>+7.2}", cell.reward)?,
                    CellKind::Start => write!(f, " {:>7}", "S")?,
                    CellKind::Normal => write!(f, " {:>7}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
