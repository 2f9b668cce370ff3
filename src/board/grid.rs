//! The N×N board: occupancy, movement rules, guard patrol and catch detection.
//!
//! Cells store a small [`Slot`] tag rather than whole pieces. The player and the
//! guards live in their own fields, so there is exactly one copy of each and the
//! grid only says who is standing where. Everything handed back to callers is
//! materialised into fresh [`Piece`] values.

use log::trace;

use super::piece::{Direction, Guard, Item, ItemKind, Piece, Player, Position};
use crate::errors::GameError;

/// Largest accepted board edge length.
pub const MAX_BOARD_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Player,
    /// Index into `Board::guards`.
    Guard(usize),
    Item(ItemKind),
}

/// Result of checking whether a piece may step in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCheck {
    /// Destination cell when the move is allowed.
    pub target: Option<Position>,
    /// Destination currently holds a basket.
    pub collectible: bool,
}

impl MoveCheck {
    fn blocked() -> Self {
        MoveCheck {
            target: None,
            collectible: false,
        }
    }

    pub fn allowed(&self) -> bool {
        self.target.is_some()
    }
}

/// Outcome of [`Board::move_player`]. `from == to` when the step was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMove {
    pub from: Position,
    pub to: Position,
    pub collected: bool,
}

/// Outcome of [`Board::move_guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardMove {
    pub index: usize,
    pub from: Position,
    pub to: Position,
    /// The guard was blocked and turned around instead of moving.
    pub reversed: bool,
    /// Basket put back on the vacated cell.
    pub restored: Option<Item>,
}

#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    basket_goal: u32,
    cells: Vec<Option<Slot>>, // row-major size*size
    guards: Vec<Guard>,
    player: Player,
}

impl Board {
    /// Empty board with the player in the top-left corner.
    ///
    /// `size` must be between 1 and [`MAX_BOARD_SIZE`].
    pub fn new(size: usize, basket_goal: u32) -> Result<Self, GameError> {
        let cell_count = Some(size)
            .filter(|n| (1..=MAX_BOARD_SIZE).contains(n))
            .and_then(|n| n.checked_mul(n))
            .ok_or_else(|| {
                GameError::InvalidArgument(format!(
                    "board size must be between 1 and {MAX_BOARD_SIZE}, got {size}"
                ))
            })?;
        let mut cells = vec![None; cell_count];
        cells[0] = Some(Slot::Player);
        Ok(Board {
            size,
            basket_goal,
            cells,
            guards: Vec::new(),
            player: Player::new(0, 0),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Baskets the player still has to collect to win this board.
    pub fn basket_goal(&self) -> u32 {
        self.basket_goal
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn guards(&self) -> Vec<Guard> {
        self.guards.clone()
    }

    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row < self.size && pos.col < self.size {
            Some(pos.row * self.size + pos.col)
        } else {
            None
        }
    }

    // Positions held by the player and guards are always in range.
    fn flat(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }

    fn slot(&self, pos: Position) -> Option<Slot> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    fn materialise(&self, slot: Slot, pos: Position) -> Option<Piece> {
        match slot {
            Slot::Player => Some(Piece::Player(self.player)),
            Slot::Guard(i) => self.guards.get(i).copied().map(Piece::Guard),
            Slot::Item(kind) => Some(Piece::Item(Item {
                kind,
                position: pos,
            })),
        }
    }

    /// Copy of whatever stands on `pos`. `None` for empty or out-of-range cells.
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.slot(pos).and_then(|slot| self.materialise(slot, pos))
    }

    /// Deep copy of the whole grid, indexed `[row][col]`.
    pub fn cells(&self) -> Vec<Vec<Option<Piece>>> {
        (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| self.piece_at(Position::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Whether the player's cell actually holds the player.
    pub fn player_placed(&self) -> bool {
        self.slot(self.player.position) == Some(Slot::Player)
    }

    /// Place `piece` on the cell named by its own position.
    ///
    /// Guards are registered for patrol; placing a player relocates the single
    /// player. Overwriting a guard's cell unregisters that guard.
    pub fn set_piece(&mut self, piece: impl Into<Piece>) -> Result<(), GameError> {
        let piece = piece.into();
        let pos = piece.position();
        let idx = self.index(pos).ok_or_else(|| {
            GameError::InvalidArgument(format!(
                "position {pos} is outside the {n}x{n} board",
                n = self.size
            ))
        })?;

        if let Some(Slot::Guard(g)) = self.cells[idx] {
            self.unregister_guard(g);
        }

        let slot = match piece {
            Piece::Player(player) => {
                let old = self.flat(self.player.position);
                if old != idx && self.cells[old] == Some(Slot::Player) {
                    self.cells[old] = None;
                }
                self.player = player;
                Slot::Player
            }
            Piece::Guard(guard) => {
                self.guards.push(guard);
                Slot::Guard(self.guards.len() - 1)
            }
            Piece::Item(item) => Slot::Item(item.kind),
        };
        self.cells[idx] = Some(slot);
        Ok(())
    }

    fn unregister_guard(&mut self, index: usize) {
        self.guards.remove(index);
        for cell in self.cells.iter_mut() {
            if let Some(Slot::Guard(j)) = cell {
                if *j > index {
                    *j -= 1;
                }
            }
        }
    }

    /// Whether a piece at `from` may step in `direction`.
    ///
    /// Off-board destinations are refused. Occupied destinations are allowed
    /// only when they hold a basket.
    pub fn can_move(&self, direction: Direction, from: Position) -> MoveCheck {
        let Some(target) = from.step(direction, self.size) else {
            return MoveCheck::blocked();
        };
        match self.slot(target) {
            None => MoveCheck {
                target: Some(target),
                collectible: false,
            },
            Some(Slot::Item(kind)) if kind.is_collectible() => MoveCheck {
                target: Some(target),
                collectible: true,
            },
            Some(_) => MoveCheck::blocked(),
        }
    }

    /// Step the player. A basket on the destination is consumed.
    pub fn move_player(&mut self, direction: Direction) -> PlayerMove {
        let from = self.player.position;
        let check = self.can_move(direction, from);
        let Some(to) = check.target else {
            trace!("player blocked at {} moving {}", from, direction);
            return PlayerMove {
                from,
                to: from,
                collected: false,
            };
        };
        let (fi, ti) = (self.flat(from), self.flat(to));
        self.cells[fi] = None;
        self.player.position = to;
        self.cells[ti] = Some(Slot::Player);
        PlayerMove {
            from,
            to,
            collected: check.collectible,
        }
    }

    /// Advance guard `index` one cell along its pivot, or turn it around.
    ///
    /// A guard stepping onto a basket hides it; the basket is written back
    /// the next time that guard leaves the cell.
    pub fn move_guard(&mut self, index: usize) -> Result<GuardMove, GameError> {
        let guard = *self.guards.get(index).ok_or_else(|| {
            GameError::InvalidArgument(format!(
                "guard index {index} out of range ({} guards)",
                self.guards.len()
            ))
        })?;
        let from = guard.position;
        let check = self.can_move(guard.pivot, from);

        let Some(to) = check.target else {
            self.guards[index].reverse();
            trace!(
                "guard {} blocked at {}, now heading {}",
                index,
                from,
                self.guards[index].pivot
            );
            return Ok(GuardMove {
                index,
                from,
                to: from,
                reversed: true,
                restored: None,
            });
        };

        let (fi, ti) = (self.flat(from), self.flat(to));
        self.cells[fi] = None;

        // Uncover before the position changes: compare against the old cell.
        let restored = match guard.carried {
            Some(item) if item.position == from => {
                self.cells[fi] = Some(Slot::Item(item.kind));
                Some(item)
            }
            _ => None,
        };

        let covered = match self.cells[ti] {
            Some(Slot::Item(kind)) if check.collectible => Some(Item { kind, position: to }),
            _ => None,
        };

        let g = &mut self.guards[index];
        if restored.is_some() {
            g.carried = None;
        }
        g.position = to;
        if covered.is_some() {
            g.carried = covered;
        }
        self.cells[ti] = Some(Slot::Guard(index));

        Ok(GuardMove {
            index,
            from,
            to,
            reversed: false,
            restored,
        })
    }

    /// True when `pos` is within one cell (diagonals included) of the player.
    pub fn guard_caught_player(&self, pos: Position) -> bool {
        pos.chebyshev(self.player.position) <= 1
    }

    pub fn any_guard_caught_player(&self) -> bool {
        self.guards
            .iter()
            .any(|g| self.guard_caught_player(g.position))
    }

    /// ASCII map, one line per row: `Y` player, `R` guard, `P` basket, `T` tree, `.` empty.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = self
                    .piece_at(Position::new(row, col))
                    .map(|p| p.tag())
                    .unwrap_or('.');
                out.push(ch);
            }
            if row + 1 < self.size {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board9() -> Board {
        Board::new(9, 5).unwrap()
    }

    #[test]
    fn new_board_places_player_top_left() {
        let b = board9();
        assert_eq!(b.player().position, Position::new(0, 0));
        assert!(matches!(
            b.piece_at(Position::new(0, 0)),
            Some(Piece::Player(_))
        ));
        assert!(b.player_placed());
        assert!(Board::new(0, 1).is_err());
    }

    #[test]
    fn oversized_board_is_rejected_without_allocating() {
        assert!(Board::new(MAX_BOARD_SIZE, 1).is_ok());
        for size in [MAX_BOARD_SIZE + 1, 100_000, usize::MAX] {
            assert!(matches!(
                Board::new(size, 1),
                Err(GameError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn player_blocked_by_walls_and_trees() {
        let mut b = board9();
        b.set_piece(Item::tree(0, 1)).unwrap();
        b.set_piece(Item::tree(1, 0)).unwrap();
        for d in Direction::ALL {
            let mv = b.move_player(d);
            assert_eq!(mv.from, mv.to);
            assert!(!mv.collected);
        }
        assert_eq!(b.player().position, Position::new(0, 0));
    }

    #[test]
    fn player_collects_basket() {
        let mut b = board9();
        b.set_piece(Item::basket(0, 1)).unwrap();
        let mv = b.move_player(Direction::Right);
        assert!(mv.collected);
        assert_eq!(mv.to, Position::new(0, 1));
        assert!(b.piece_at(Position::new(0, 0)).is_none());
        assert!(matches!(
            b.piece_at(Position::new(0, 1)),
            Some(Piece::Player(_))
        ));
    }

    #[test]
    fn player_cannot_walk_into_guard() {
        let mut b = board9();
        b.set_piece(Guard::new(0, 1, Direction::Down)).unwrap();
        let mv = b.move_player(Direction::Right);
        assert_eq!(mv.to, Position::new(0, 0));
    }

    #[test]
    fn guard_reverses_at_wall_without_moving() {
        let mut b = board9();
        b.set_piece(Guard::new(0, 8, Direction::Right)).unwrap();
        let mv = b.move_guard(0).unwrap();
        assert!(mv.reversed);
        assert_eq!(mv.from, mv.to);
        let g = b.guards()[0];
        assert_eq!(g.pivot, Direction::Left);
        assert_eq!(g.axis(), 'l');
        assert_eq!(g.position, Position::new(0, 8));
    }

    #[test]
    fn guard_reverses_at_tree() {
        let mut b = board9();
        b.set_piece(Guard::new(2, 2, Direction::Down)).unwrap();
        b.set_piece(Item::tree(3, 2)).unwrap();
        b.move_guard(0).unwrap();
        let g = b.guards()[0];
        assert_eq!(g.pivot, Direction::Up);
        assert_eq!(g.position, Position::new(2, 2));
    }

    #[test]
    fn guard_covers_and_restores_basket() {
        let mut b = board9();
        b.set_piece(Guard::new(4, 2, Direction::Right)).unwrap();
        b.set_piece(Item::basket(4, 3)).unwrap();

        let mv = b.move_guard(0).unwrap();
        assert_eq!(mv.to, Position::new(4, 3));
        assert!(matches!(
            b.piece_at(Position::new(4, 3)),
            Some(Piece::Guard(g)) if g.is_covering()
        ));

        let mv = b.move_guard(0).unwrap();
        assert_eq!(mv.restored, Some(Item::basket(4, 3)));
        assert_eq!(
            b.piece_at(Position::new(4, 3)),
            Some(Piece::Item(Item::basket(4, 3)))
        );
        assert!(!b.guards()[0].is_covering());
        assert_eq!(b.guards()[0].position, Position::new(4, 4));
    }

    #[test]
    fn guard_on_basket_reversing_keeps_it_hidden() {
        let mut b = board9();
        b.set_piece(Guard::new(4, 7, Direction::Right)).unwrap();
        b.set_piece(Item::basket(4, 8)).unwrap();
        b.move_guard(0).unwrap(); // onto the basket at the edge
        let mv = b.move_guard(0).unwrap(); // wall: reverse only
        assert!(mv.reversed);
        assert!(matches!(
            b.piece_at(Position::new(4, 8)),
            Some(Piece::Guard(_))
        ));
        b.move_guard(0).unwrap(); // leaves, basket reappears
        assert_eq!(
            b.piece_at(Position::new(4, 8)),
            Some(Piece::Item(Item::basket(4, 8)))
        );
    }

    #[test]
    fn catch_detection_uses_chebyshev_distance() {
        let mut b = board9();
        b.set_piece(Player::new(4, 4)).unwrap();
        assert!(b.piece_at(Position::new(0, 0)).is_none());
        assert!(b.guard_caught_player(Position::new(5, 5)));
        assert!(b.guard_caught_player(Position::new(3, 4)));
        assert!(!b.guard_caught_player(Position::new(6, 4)));
        assert!(!b.any_guard_caught_player());
        b.set_piece(Guard::new(3, 3, Direction::Up)).unwrap();
        assert!(b.any_guard_caught_player());
    }

    #[test]
    fn set_piece_rejects_out_of_range() {
        let mut b = board9();
        assert!(matches!(
            b.set_piece(Item::tree(9, 0)),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(matches!(
            b.move_guard(0),
            Err(GameError::InvalidArgument(_))
        ));
    }

    #[test]
    fn overwriting_a_guard_unregisters_it() {
        let mut b = board9();
        b.set_piece(Guard::new(2, 2, Direction::Up)).unwrap();
        b.set_piece(Guard::new(5, 5, Direction::Left)).unwrap();
        b.set_piece(Item::tree(2, 2)).unwrap();
        assert_eq!(b.guard_count(), 1);
        assert!(matches!(
            b.piece_at(Position::new(5, 5)),
            Some(Piece::Guard(g)) if g.pivot == Direction::Left
        ));
    }

    #[test]
    fn returned_copies_do_not_alias_state() {
        let mut b = board9();
        b.set_piece(Guard::new(2, 2, Direction::Up)).unwrap();
        let mut copies = b.guards();
        copies[0].position = Position::new(7, 7);
        copies[0].reverse();
        assert_eq!(b.guards()[0].position, Position::new(2, 2));
        assert_eq!(b.guards()[0].pivot, Direction::Up);
    }

    #[test]
    fn render_draws_every_cell() {
        let mut b = Board::new(3, 1).unwrap();
        b.set_piece(Item::basket(1, 1)).unwrap();
        b.set_piece(Guard::new(2, 0, Direction::Right)).unwrap();
        b.set_piece(Item::tree(2, 2)).unwrap();
        assert_eq!(b.render(), "Y..\n.P.\nR.T");
    }
}
