//! Session manager: maps live connections to players and their tables.

use std::collections::HashMap;

use tictac_protocol::{PlayerId, TableId};
use tictac_transport::ConnectionId;

use crate::{Session, SessionError};

/// Tracks every live session.
///
/// Not synchronized itself; the server keeps it behind a mutex.
///
/// ```text
///   create(P-1) ──→ seat(P-1, T-3) ──→ remove(P-1)
///   [Connected]      [Seated(T-3)]      (gone; caller cleans up T-3)
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the player already has a
    /// session.
    pub fn create(
        &mut self,
        player_id: PlayerId,
        connection_id: ConnectionId,
    ) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        tracing::info!(%player_id, %connection_id, "session created");
        Ok(self
            .sessions
            .entry(player_id)
            .or_insert_with(|| Session::new(player_id, connection_id)))
    }

    /// Destroys a session and hands it back so the caller can clean up
    /// the table it was seated at.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn remove(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(
            %player_id,
            table_id = ?session.table_id,
            connected_for = ?session.connected_for(),
            "session removed"
        );
        Ok(session)
    }

    /// Records that the player now sits at `table_id`.
    ///
    /// Returns the table the player sat at before, if it was a
    /// different one.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn seat(
        &mut self,
        player_id: PlayerId,
        table_id: TableId,
    ) -> Result<Option<TableId>, SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        let previous = session.table_id.replace(table_id);
        Ok(previous.filter(|prev| *prev != table_id))
    }

    /// The table the player currently sits at.
    pub fn table_of(&self, player_id: PlayerId) -> Option<TableId> {
        self.sessions.get(&player_id).and_then(|s| s.table_id)
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.sessions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
