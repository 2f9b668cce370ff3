//! # Board Module
//!
//! The piece model and the grid the chase is played on.
//!
//! - [`piece`] - `Position`, `Direction` and the `Piece` variants (player, guard, item)
//! - [`grid`] - `Board`: occupancy, movement and collision rules, guard patrol, catch checks
//!
//! ## Movement rules
//!
//! A piece may step onto an empty cell or a basket. Trees, guards, the player and
//! the board edge block. A guard that is blocked turns around and stays put for
//! that tick; a guard that steps onto a basket hides it until it walks off again.
//!
//! ```rust
//! use parkchase::board::{Board, Direction, Guard, Item, Position};
//!
//! let mut board = Board::new(5, 1).unwrap();
//! board.set_piece(Item::basket(0, 1)).unwrap();
//! board.set_piece(Guard::new(4, 4, Direction::Up)).unwrap();
//!
//! let mv = board.move_player(Direction::Right);
//! assert!(mv.collected);
//! assert_eq!(board.player().position, Position::new(0, 1));
//! ```

pub mod grid;
pub mod piece;

pub use grid::{Board, GuardMove, MoveCheck, PlayerMove, MAX_BOARD_SIZE};
pub use piece::{Direction, Guard, Item, ItemKind, Piece, Player, Position};
