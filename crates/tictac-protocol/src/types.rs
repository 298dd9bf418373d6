//! Core protocol types for the lobby's wire format.
//!
//! Every type here travels on the wire as JSON. Inbound messages are
//! `{"command": ..., ...}` objects decoded into [`ClientCommand`];
//! outbound messages are `{"type": ..., ...}` objects built from
//! [`ServerMessage`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tictac_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A player is identified by the connection it arrived on, so the id is
/// stable for exactly as long as the connection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

/// A unique identifier for a table. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Board vocabulary
// ---------------------------------------------------------------------------

/// A player's symbol. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The symbol that moves after this one.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// The symbol owned by the player in seat `index` (0 = X, 1 = O).
    pub fn for_seat(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::X),
            1 => Some(Self::O),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

/// One square of the board. Empty squares go on the wire as `" "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    #[serde(rename = " ")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The mark occupying this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Self::Empty => None,
            Self::X => Some(Mark::X),
            Self::O => Some(Mark::O),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, " "),
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

/// The terminal result of a game. `None` on the wire means still playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    X,
    O,
    Draw,
}

impl From<Mark> for Outcome {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
            Self::Draw => write!(f, "Draw"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// An immutable copy of one table's full state.
///
/// ```text
/// {"id": 1, "board": ["X"," "," "," "," "," "," "," "," "],
///  "turn": "O", "winner": null, "players": 2, "available": false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub id: TableId,
    /// Row-major: 0,1,2 / 3,4,5 / 6,7,8.
    pub board: [Cell; 9],
    pub turn: Mark,
    pub winner: Option<Outcome>,
    /// Number of seated players (0..=2).
    pub players: usize,
    pub available: bool,
}

/// Coarse lobby status of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Waiting,
    Playing,
}

impl TableStatus {
    /// Two seated players means playing; anything else (including an
    /// empty table) reports as waiting.
    pub fn from_player_count(players: usize) -> Self {
        if players == 2 { Self::Playing } else { Self::Waiting }
    }
}

/// One row of the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: TableId,
    pub available: bool,
    pub players: usize,
    pub status: TableStatus,
}

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------

/// A command sent by a client.
///
/// Decoded once from `{"command": "...", ...}` and matched exhaustively
/// by the dispatcher. Unknown fields are ignored; unknown commands fail
/// to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    /// Create a table and sit at it.
    CreateTable,

    /// Sit at an existing table.
    JoinTable { table_id: TableId },

    /// Place the mover's symbol at `position` (0..9).
    ///
    /// Kept signed so an out-of-range position still decodes and is
    /// rejected as an illegal move rather than a malformed message.
    MakeMove { table_id: TableId, position: i64 },

    /// Ask for the lobby listing.
    GetTables,
}

// ---------------------------------------------------------------------------
// Outbound notifications
// ---------------------------------------------------------------------------

/// A notification sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A command failed. Only ever sent to the requester.
    Error { message: String },

    /// The lobby listing.
    Tables { tables: Vec<TableSummary> },

    /// Reply to a successful join.
    TableJoined { table: TableSnapshot },

    /// A table changed; sent to its players.
    TableState { table: TableSnapshot },

    /// The second player sat down.
    GameStart { table: TableSnapshot },

    /// A winner or draw was determined.
    GameEnd { table: TableSnapshot },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
