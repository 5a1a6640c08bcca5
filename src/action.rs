use std::fmt;

use serde::Deserialize;

/// Compass moves in their fixed cyclic order. Declaration order is also the
/// tie-break order for every argmax over actions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Unit displacement as (d_row, d_col). Row numbers grow upwards.
    pub fn displacement(self) -> (i64, i64) {
        match self {
            Action::Up => (1, 0),
            Action::Right => (0, 1),
            Action::Down => (-1, 0),
            Action::Left => (0, -1),
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// One step counter-clockwise in the cycle.
    pub fn left_turn(self) -> Action {
        Action::ALL[(self.index() + Action::ALL.len() - 1) % Action::ALL.len()]
    }

    /// One step clockwise in the cycle.
    pub fn right_turn(self) -> Action {
        Action::ALL[(self.index() + 1) % Action::ALL.len()]
    }

    pub fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Right => '→',
            Action::Down => '↓',
            Action::Left => '←',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
        };
        f.write_str(name)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Action::Up, Action::Left, Action::Right; "Up")]
    #[test_case(Action::Right, Action::Up, Action::Down; "Right")]
    #[test_case(Action::Down, Action::Right, Action::Left; "Down")]
    #[test_case(Action::Left, Action::Down, Action::Up; "Left wraps to Up")]
    fn turns_follow_cycle(a: Action, left: Action, right: Action) {
        assert_eq!(a.left_turn(), left);
        assert_eq!(a.right_turn(), right);
    }

    #[test]
    fn turns_are_perpendicular() {
        for a in Action::ALL {
            let (dr, dc) = a.displacement();
            for turned in [a.left_turn(), a.right_turn()] {
                let (tr, tc) = turned.displacement();
                assert_eq!(dr * tr + dc * tc, 0);
            }
        }
    }
}
