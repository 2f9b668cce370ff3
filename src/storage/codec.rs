//! Line-oriented text format for a board snapshot.
//!
//! ```text
//! 9 5          <- board size, baskets still needed
//! Y 0 0        <- player
//! R 2 4 d      <- guard, axis u/d/l/r = current pivot
//! P 3 3        <- basket
//! T 4 0        <- tree
//! ```
//!
//! Piece lines are written in row-major order and empty cells are skipped.
//! A guard standing on a basket is written as the guard only.

use std::io::{BufRead, Write};
use std::num::ParseIntError;
use std::str::FromStr;

use crate::board::{Board, Direction, Guard, Item, Piece, Player, MAX_BOARD_SIZE};
use crate::errors::{BoardDataError, DataCause};

/// Parse a board from `reader`. Every failure comes back as a [`BoardDataError`].
pub fn read_board<R: BufRead>(reader: R) -> Result<Board, BoardDataError> {
    parse(reader).map_err(BoardDataError::load)
}

/// Write `board` to `writer`. The header carries the goal minus `collected`,
/// so reloading the file continues the game where it was left.
pub fn write_board<W: Write>(
    writer: W,
    board: &Board,
    collected: u32,
) -> Result<(), BoardDataError> {
    emit(writer, board, collected).map_err(BoardDataError::save)
}

/// One save-file line for `piece`, without the newline.
pub fn encode_piece(piece: &Piece) -> String {
    let pos = piece.position();
    match piece {
        Piece::Guard(g) => format!("R {} {} {}", pos.row, pos.col, g.axis()),
        other => format!("{} {} {}", other.tag(), pos.row, pos.col),
    }
}

fn number<T>(line: usize, field: &'static str, raw: Option<&str>) -> Result<T, DataCause>
where
    T: FromStr<Err = ParseIntError>,
{
    let raw = raw.ok_or(DataCause::MissingField { line, field })?;
    raw.parse().map_err(|source| DataCause::InvalidNumber {
        line,
        field,
        value: raw.to_string(),
        source,
    })
}

fn parse<R: BufRead>(reader: R) -> Result<Board, DataCause> {
    let mut lines = reader.lines();

    let header = lines.next().ok_or(DataCause::MissingHeader)??;
    let mut fields = header.split(' ');
    let size: i64 = number(1, "board size", fields.next())?;
    let goal: u32 = number(1, "basket goal", fields.next())?;
    let size = usize::try_from(size)
        .ok()
        .filter(|n| (1..=MAX_BOARD_SIZE).contains(n) && n.checked_mul(*n).is_some())
        .ok_or(DataCause::BoardSize(size))?;
    let mut board = Board::new(size, goal).map_err(|e| DataCause::Placement {
        line: 1,
        source: Box::new(e),
    })?;

    for (i, line) in lines.enumerate() {
        let line = line?;
        let n = i + 2;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(' ');
        let tag = fields.next().unwrap_or_default();
        if !matches!(tag, "Y" | "R" | "P" | "T") {
            return Err(DataCause::UnknownTag {
                line: n,
                tag: tag.to_string(),
            });
        }
        let row: usize = number(n, "row", fields.next())?;
        let col: usize = number(n, "column", fields.next())?;

        let piece: Piece = match tag {
            "Y" => Player::new(row, col).into(),
            "R" => {
                let axis = fields.next().ok_or(DataCause::MissingField {
                    line: n,
                    field: "axis",
                })?;
                let pivot = Direction::from_axis(axis).ok_or_else(|| DataCause::UnknownAxis {
                    line: n,
                    axis: axis.to_string(),
                })?;
                Guard::new(row, col, pivot).into()
            }
            "P" => Item::basket(row, col).into(),
            _ => Item::tree(row, col).into(),
        };
        board.set_piece(piece).map_err(|e| DataCause::Placement {
            line: n,
            source: Box::new(e),
        })?;
    }

    if !board.player_placed() {
        return Err(DataCause::MissingPlayer);
    }
    Ok(board)
}

fn emit<W: Write>(mut writer: W, board: &Board, collected: u32) -> std::io::Result<()> {
    writeln!(
        writer,
        "{} {}",
        board.size(),
        board.basket_goal().saturating_sub(collected)
    )?;
    for row in board.cells() {
        for piece in row.iter().flatten() {
            writeln!(writer, "{}", encode_piece(piece))?;
        }
    }
    writer.flush()
}
