//! Value types for everything that can stand on a board cell.
//!
//! All pieces are plain `Copy` values. The board hands out copies, so nothing a
//! caller does with a returned piece can reach back into engine state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// A cell coordinate, 0-indexed. `row` grows downwards, `col` to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// The neighbouring cell in `direction`, or `None` if it would leave a
    /// `size`×`size` board.
    pub fn step(self, direction: Direction, size: usize) -> Option<Position> {
        let (row, col) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Right => (self.row, self.col + 1),
        };
        if row < size && col < size {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// Chebyshev distance: diagonal neighbours are 1 apart.
    pub fn chebyshev(self, other: Position) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Axis letter used in save files (`u`, `d`, `l`, `r`).
    pub fn axis(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }

    pub fn from_axis(axis: &str) -> Option<Direction> {
        match axis {
            "u" => Some(Direction::Up),
            "d" => Some(Direction::Down),
            "l" => Some(Direction::Left),
            "r" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    /// Parse a direction word (case-insensitive) or an axis letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            other => Err(GameError::InvalidArgument(format!(
                "unrecognized direction {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Collectible; player pickups count toward the goal.
    Basket,
    /// Impassable obstacle.
    Tree,
}

impl ItemKind {
    pub fn is_collectible(self) -> bool {
        match self {
            ItemKind::Basket => true,
            ItemKind::Tree => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub position: Position,
}

impl Item {
    pub fn basket(row: usize, col: usize) -> Self {
        Item {
            kind: ItemKind::Basket,
            position: Position::new(row, col),
        }
    }

    pub fn tree(row: usize, col: usize) -> Self {
        Item {
            kind: ItemKind::Tree,
            position: Position::new(row, col),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
}

impl Player {
    pub fn new(row: usize, col: usize) -> Self {
        Player {
            position: Position::new(row, col),
        }
    }
}

/// A patrolling piece that walks along `pivot` and turns around when blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub position: Position,
    pub pivot: Direction,
    /// Basket hidden underneath this guard, if it is standing on one.
    pub carried: Option<Item>,
}

impl Guard {
    pub fn new(row: usize, col: usize, pivot: Direction) -> Self {
        Guard {
            position: Position::new(row, col),
            pivot,
            carried: None,
        }
    }

    /// Axis label derived from the current pivot.
    pub fn axis(&self) -> char {
        self.pivot.axis()
    }

    pub fn is_covering(&self) -> bool {
        self.carried.is_some()
    }

    pub fn reverse(&mut self) {
        self.pivot = self.pivot.opposite();
    }
}

/// Anything that can occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Piece {
    Player(Player),
    Guard(Guard),
    Item(Item),
}

impl Piece {
    pub fn position(&self) -> Position {
        match self {
            Piece::Player(p) => p.position,
            Piece::Guard(g) => g.position,
            Piece::Item(i) => i.position,
        }
    }

    /// Only baskets may be walked onto.
    pub fn is_collectible(&self) -> bool {
        match self {
            Piece::Item(item) => item.kind.is_collectible(),
            Piece::Player(_) | Piece::Guard(_) => false,
        }
    }

    /// Single-letter tag, shared by save files and the ASCII map.
    pub fn tag(&self) -> char {
        match self {
            Piece::Player(_) => 'Y',
            Piece::Guard(_) => 'R',
            Piece::Item(Item {
                kind: ItemKind::Basket,
                ..
            }) => 'P',
            Piece::Item(Item {
                kind: ItemKind::Tree,
                ..
            }) => 'T',
        }
    }
}

impl From<Player> for Piece {
    fn from(p: Player) -> Self {
        Piece::Player(p)
    }
}

impl From<Guard> for Piece {
    fn from(g: Guard) -> Self {
        Piece::Guard(g)
    }
}

impl From<Item> for Piece {
    fn from(i: Item) -> Self {
        Piece::Item(i)
    }
}
