//! Error types for table and registry operations.

use std::fmt;

use tictac_protocol::{PlayerId, TableId};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// The position is not a board index (0..9).
    OutOfRange(i64),
    /// The cell already holds a mark.
    Occupied(usize),
    /// A winner or draw has already been recorded.
    GameOver,
    /// The mover's seat does not own the symbol whose turn it is.
    NotYourTurn,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(position) => write!(f, "position {position} is outside 0..9"),
            Self::Occupied(index) => write!(f, "cell {index} is occupied"),
            Self::GameOver => write!(f, "game is already over"),
            Self::NotYourTurn => write!(f, "not your turn"),
        }
    }
}

/// Errors that can occur during table and registry operations.
///
/// All of these are local to one request: the dispatcher turns them
/// into an `error` notification for the requester and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The table does not exist (never created, or already removed).
    #[error("table {0} not found")]
    NotFound(TableId),

    /// Both seats are taken.
    #[error("table {0} is full")]
    Full(TableId),

    /// Too many tables are already waiting for players.
    #[error("cannot create a table now: {limit} tables are already waiting for players")]
    CapacityExceeded { limit: usize },

    /// The move broke a game rule.
    #[error("illegal move: {0}")]
    IllegalMove(MoveRejection),

    /// The player does not sit at the table.
    #[error("player {0} is not seated at table {1}")]
    NotAPlayer(PlayerId, TableId),

    /// The player already sits at the table.
    #[error("player {0} is already seated at table {1}")]
    AlreadySeated(PlayerId, TableId),
}

impl From<MoveRejection> for TableError {
    fn from(rejection: MoveRejection) -> Self {
        Self::IllegalMove(rejection)
    }
}
