use approx::abs_diff_eq;

use crate::action::Action;
use crate::error::InvalidProbabilityError;

/// Tolerance on the probability sum.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Which way the agent actually went relative to the action it chose.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Slip {
    Intended,
    LeftTurn,
    RightTurn,
}

impl Slip {
    pub const ALL: [Slip; 3] = [Slip::Intended, Slip::LeftTurn, Slip::RightTurn];

    pub fn apply(self, action: Action) -> Action {
        match self {
            Slip::Intended => action,
            Slip::LeftTurn => action.left_turn(),
            Slip::RightTurn => action.right_turn(),
        }
    }
}

/// Stochastic movement model. `stay` is residual mass for outcomes with no
/// valid move; blocked moves already collapse to "stay" inside the other
/// three branches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementModel {
    intended: f64,
    left_turn: f64,
    right_turn: f64,
    stay: f64,
}

impl Default for MovementModel {
    fn default() -> Self {
        MovementModel { intended: 0.8, left_turn: 0.1, right_turn: 0.1, stay: 0.0 }
    }
}

impl MovementModel {
    pub fn new(
        intended: f64, left_turn: f64, right_turn: f64, stay: f64,
    ) -> Result<MovementModel, InvalidProbabilityError> {
        for (name, value) in [
            ("intended", intended),
            ("left-turn", left_turn),
            ("right-turn", right_turn),
            ("stay", stay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidProbabilityError::OutOfRange { name, value });
            }
        }
        let sum = intended + left_turn + right_turn + stay;
        if !abs_diff_eq!(sum, 1.0, epsilon = PROBABILITY_TOLERANCE) {
            return Err(InvalidProbabilityError::BadSum(sum));
        }
        Ok(MovementModel { intended, left_turn, right_turn, stay })
    }

    pub fn intended(&self) -> f64 {
        self.intended
    }

    pub fn left_turn(&self) -> f64 {
        self.left_turn
    }

    pub fn right_turn(&self) -> f64 {
        self.right_turn
    }

    pub fn stay(&self) -> f64 {
        self.stay
    }

    pub fn probability(&self, slip: Slip) -> f64 {
        match slip {
            Slip::Intended => self.intended,
            Slip::LeftTurn => self.left_turn,
            Slip::RightTurn => self.right_turn,
        }
    }

    /// Map a uniform sample `r` in [0, 1) to a slip. The three branches
    /// partition the whole interval; `stay` is not sampled separately.
    pub fn sample(&self, r: f64) -> Slip {
        if r < self.intended {
            Slip::Intended
        } else if r < self.intended + self.left_turn {
            Slip::LeftTurn
        } else {
            Slip::RightTurn
        }
    }
}
