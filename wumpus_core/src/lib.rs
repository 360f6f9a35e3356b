use std::ops::Index;

use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod environment;
pub mod episode;
pub mod knowledge;
pub mod map;
pub mod planner;

/// Represents a 2D coordinate. `y` grows downward (screen axes).
///
/// Ordering is lexicographic on `(x, y)`, which is what makes set iteration
/// (and therefore every tie-break in the agent) deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// The start cell. Always safe, and the only cell the agent can climb out from.
    pub const HOME: Position = Position { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Compass heading of the agent.
///
/// The discriminants are significant: `+1 mod 4` is a clockwise turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Counter-clockwise quarter turn.
    pub fn turn_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Clockwise quarter turn.
    pub fn turn_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Unit step taken by a forward move.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Orientation::North => (0, -1),
            Orientation::East => (1, 0),
            Orientation::South => (0, 1),
            Orientation::West => (-1, 0),
        }
    }
}

/// Represents actions an agent can decide to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    TurnLeft,
    TurnRight,
    Grab,
    Shoot,
    Climb,
}

/// The kinds of percept the environment reports each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Percept {
    /// A pit is orthogonally adjacent.
    Breeze,
    /// The gold is in the current cell.
    Glitter,
    /// The last forward move hit the edge of the world. One-shot.
    Bump,
    /// A live wumpus is orthogonally adjacent.
    Stench,
    /// The arrow killed the wumpus. One-shot.
    Scream,
}

/// One step's worth of percepts, one flag per [`Percept`] kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percepts {
    pub breeze: bool,
    pub glitter: bool,
    pub bump: bool,
    pub stench: bool,
    pub scream: bool,
}

impl Percepts {
    pub fn get(&self, kind: Percept) -> bool {
        self[kind]
    }
}

impl Index<Percept> for Percepts {
    type Output = bool;

    fn index(&self, kind: Percept) -> &Self::Output {
        match kind {
            Percept::Breeze => &self.breeze,
            Percept::Glitter => &self.glitter,
            Percept::Bump => &self.bump,
            Percept::Stench => &self.stench,
            Percept::Scream => &self.scream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_wrap_around() {
        assert_eq!(Orientation::North.turn_left(), Orientation::West);
        assert_eq!(Orientation::West.turn_right(), Orientation::North);
        assert_eq!(Orientation::East.turn_right(), Orientation::South);
        assert_eq!(Orientation::East.turn_left(), Orientation::North);
    }

    #[test]
    fn north_decreases_y() {
        assert_eq!(Orientation::North.delta(), (0, -1));
        assert_eq!(Orientation::South.delta(), (0, 1));
    }

    #[test]
    fn percepts_index_by_kind() {
        let percepts = Percepts {
            stench: true,
            ..Default::default()
        };
        assert!(percepts[Percept::Stench]);
        assert!(!percepts.get(Percept::Breeze));
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(3, 1);
        let b = Position::new(0, 2);
        assert_eq!(a.manhattan_distance(&b), 4);
        assert_eq!(b.manhattan_distance(&a), 4);
    }
}
