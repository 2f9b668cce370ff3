//! Error types shared by the board, the persistence codec and the engine.

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Whether a board-data failure happened while reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAction {
    Load,
    Save,
}

impl fmt::Display for DataAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAction::Load => write!(f, "load"),
            DataAction::Save => write!(f, "save"),
        }
    }
}

/// Underlying reason a board file could not be read or written.
#[derive(Debug, Error)]
pub enum DataCause {
    /// Wrapper around IO errors (open, read, write, rename, lock).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file had no header line.
    #[error("missing header line")]
    MissingHeader,

    /// A line ended before a required field.
    #[error("line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },

    /// A numeric field did not parse.
    #[error("line {line}: invalid {field} {value:?}: {source}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// Header declared an unusable board size.
    #[error("board size must be between 1 and {}, got {0}", crate::board::MAX_BOARD_SIZE)]
    BoardSize(i64),

    /// Piece line started with something other than Y, R, P or T.
    #[error("line {line}: unknown piece tag {tag:?}")]
    UnknownTag { line: usize, tag: String },

    /// Guard line carried an axis other than u, d, l or r.
    #[error("line {line}: unknown guard axis {axis:?}")]
    UnknownAxis { line: usize, axis: String },

    /// The board refused the piece (coordinates out of range).
    #[error("line {line}: {source}")]
    Placement {
        line: usize,
        #[source]
        source: Box<GameError>,
    },

    /// No player line, or the player's cell was overwritten by a later line.
    #[error("board has no player")]
    MissingPlayer,
}

/// The single error surfaced by the persistence codec.
///
/// Every parse or IO failure is wrapped here with the underlying cause attached;
/// callers never see a raw `std::io::Error` or `ParseIntError`.
#[derive(Debug, Error)]
#[error("failed to {action} board data{}: {cause}", path_suffix(.path))]
pub struct BoardDataError {
    pub action: DataAction,
    pub path: Option<PathBuf>,
    #[source]
    pub cause: DataCause,
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" ({})", p.display()),
        None => String::new(),
    }
}

impl BoardDataError {
    pub fn load(cause: impl Into<DataCause>) -> Self {
        Self {
            action: DataAction::Load,
            path: None,
            cause: cause.into(),
        }
    }

    pub fn save(cause: impl Into<DataCause>) -> Self {
        Self {
            action: DataAction::Save,
            path: None,
            cause: cause.into(),
        }
    }

    /// Attach the file path the failure relates to.
    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Errors raised by board mutators and the game engine.
#[derive(Debug, Error)]
pub enum GameError {
    /// Board file could not be read or written.
    #[error(transparent)]
    BoardData(#[from] BoardDataError),

    /// Out-of-range coordinates, bad guard index, unrecognised direction token.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required collaborator (board store, board, runtime) is not available.
    #[error("operation unavailable: {0}")]
    OperationalState(String),

    /// Internal error (task join errors, unexpected conditions)
    #[error("internal error: {0}")]
    Internal(String),
}
