//! Session types: the server's record of one live connection.

use std::time::{Duration, Instant};

use tictac_protocol::{PlayerId, TableId};
use tictac_transport::ConnectionId;

/// Where a session is in its lifecycle.
///
/// ```text
///   Connected ──(join)──→ Seated(table) ──(join other)──→ Seated(other)
///       │                      │
///       └──────(disconnect: session destroyed)────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, not sitting at any table.
    Connected,
    /// Sitting at the given table.
    Seated(TableId),
}

/// One live connection and the player behind it.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub connection_id: ConnectionId,
    /// The table this player currently sits at, if any.
    pub table_id: Option<TableId>,
    pub connected_at: Instant,
}

impl Session {
    pub fn new(player_id: PlayerId, connection_id: ConnectionId) -> Self {
        Self {
            player_id,
            connection_id,
            table_id: None,
            connected_at: Instant::now(),
        }
    }

    /// How long this connection has been open.
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn state(&self) -> SessionState {
        match self.table_id {
            Some(table_id) => SessionState::Seated(table_id),
            None => SessionState::Connected,
        }
    }
}
