//! # Storage Module - Board Persistence
//!
//! Reads and writes board snapshots as plain text, one piece per line.
//!
//! - [`codec`] - the line grammar (`read_board`, `write_board`)
//! - [`file`] - the [`BoardStore`] trait and its file-backed implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parkchase::storage::{BoardStore, TextFileStore};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), parkchase::errors::BoardDataError> {
//! let board = TextFileStore.load(Path::new("levels/easy.txt"))?;
//! TextFileStore.save(Path::new("saves/slot1.txt"), &board, 0)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure, whether a short line, a bad number, an unknown tag or an IO
//! error, is reported as a single [`BoardDataError`](crate::errors::BoardDataError)
//! with the underlying cause attached.

pub mod codec;
pub mod file;

pub use codec::{encode_piece, read_board, write_board};
pub use file::{BoardStore, TextFileStore};
