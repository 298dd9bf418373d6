//! Error types for the session layer.

use tictac_protocol::PlayerId;

/// Errors that can occur during session management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a live session.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),
}
