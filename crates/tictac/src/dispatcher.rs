//! Command dispatch: turns decoded client commands into table and
//! registry operations plus the notifications they produce.
//!
//! Lock discipline: the registry lock is only held to look tables up,
//! create or remove them, and never across a table operation. Table
//! operations take the table's own lock. The session lock is never held
//! together with either.

use std::sync::Arc;

use tictac_protocol::{ClientCommand, PlayerId, ServerMessage, TableId};
use tictac_session::SessionManager;
use tictac_table::{MAX_PLAYERS, RegistryConfig, Table, TableError, TableRegistry};
use tictac_transport::ConnectionId;
use tokio::sync::Mutex;
#[cfg(test)]
use tokio::sync::mpsc;

use crate::TictacError;
use crate::broadcast::{Broadcaster, PlayerSender};

/// Shared lobby state and the operations every connection drives.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Mutex<TableRegistry>,
    sessions: Mutex<SessionManager>,
    broadcaster: Broadcaster,
}

impl Dispatcher {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            registry: Mutex::new(TableRegistry::new(config)),
            sessions: Mutex::new(SessionManager::new()),
            broadcaster: Broadcaster::new(),
        }
    }

    pub fn registry(&self) -> &Mutex<TableRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &Mutex<SessionManager> {
        &self.sessions
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Opens a session for a new connection and starts routing
    /// notifications into `sender`.
    pub async fn connect(
        &self,
        player_id: PlayerId,
        connection_id: ConnectionId,
        sender: PlayerSender,
    ) -> Result<(), TictacError> {
        self.sessions.lock().await.create(player_id, connection_id)?;
        self.broadcaster.register(player_id, sender).await;
        Ok(())
    }

    /// Runs one command. Failures are reported to the requester only.
    pub async fn dispatch(&self, player_id: PlayerId, command: ClientCommand) {
        let result = match command {
            ClientCommand::CreateTable => self.create_table(player_id).await,
            ClientCommand::JoinTable { table_id } => self.join_table(player_id, table_id).await,
            ClientCommand::MakeMove { table_id, position } => {
                self.make_move(player_id, table_id, position).await
            }
            ClientCommand::GetTables => {
                let lobby = self.lobby().await;
                self.broadcaster.send_to(player_id, lobby).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::debug!(%player_id, error = %e, "command rejected");
            self.reject(player_id, &e).await;
        }
    }

    /// Sends an `error` notification carrying `error`'s message.
    pub async fn reject(&self, player_id: PlayerId, error: &impl std::fmt::Display) {
        self.broadcaster
            .send_to(player_id, ServerMessage::error(error.to_string()))
            .await;
    }

    /// Tears down a player's session and vacates its seat.
    ///
    /// The remaining player gets the new table state; an emptied table is
    /// removed; everyone gets a fresh lobby listing.
    pub async fn disconnect(&self, player_id: PlayerId) {
        self.broadcaster.unregister(player_id).await;
        let session = match self.sessions.lock().await.remove(player_id) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "disconnect without session");
                return;
            }
        };

        if let Some(table_id) = session.table_id {
            if self.vacate(player_id, table_id).await {
                self.broadcast_lobby().await;
            }
        }
    }

    async fn create_table(&self, player_id: PlayerId) -> Result<(), TictacError> {
        let table = self.registry.lock().await.create_table()?;
        let table_id = table.id();
        let seated = self.seat_at(player_id, table).await;
        if seated.is_err() {
            self.registry.lock().await.remove_table_if_empty(table_id);
        }
        seated
    }

    async fn join_table(&self, player_id: PlayerId, table_id: TableId) -> Result<(), TictacError> {
        let table = self.table(table_id).await?;
        self.seat_at(player_id, table).await
    }

    async fn seat_at(&self, player_id: PlayerId, table: Arc<Table>) -> Result<(), TictacError> {
        let table_id = table.id();
        table.add_player(player_id).await?;

        // The last occupant may have left and taken the table with it
        // between lookup and seating. Removal needs zero players under the
        // registry lock, so once this check passes the table stays.
        let listed = self
            .registry
            .lock()
            .await
            .get_table(table_id)
            .is_some_and(|t| Arc::ptr_eq(&t, &table));
        if !listed {
            self.release_seat(player_id, &table).await;
            return Err(TableError::NotFound(table_id).into());
        }

        let seated = self.sessions.lock().await.seat(player_id, table_id);
        let previous = match seated {
            Ok(previous) => previous,
            Err(e) => {
                // Disconnected while joining; give the seat back.
                self.release_seat(player_id, &table).await;
                return Err(e.into());
            }
        };
        if let Some(previous) = previous {
            tracing::info!(%player_id, from = %previous, to = %table_id, "player switched tables");
            self.vacate(player_id, previous).await;
        }

        let view = table.view().await;
        self.broadcaster
            .send_to(
                player_id,
                ServerMessage::TableJoined {
                    table: view.snapshot.clone(),
                },
            )
            .await;
        self.broadcaster
            .send_to_players(
                &view.players,
                &ServerMessage::TableState {
                    table: view.snapshot.clone(),
                },
            )
            .await;
        self.broadcast_lobby().await;

        if view.players.len() == MAX_PLAYERS {
            tracing::info!(%table_id, "game started");
            self.broadcaster
                .send_to_players(&view.players, &ServerMessage::GameStart { table: view.snapshot })
                .await;
        }
        Ok(())
    }

    async fn make_move(
        &self,
        player_id: PlayerId,
        table_id: TableId,
        position: i64,
    ) -> Result<(), TictacError> {
        let table = self.table(table_id).await?;
        table.make_move(position, player_id).await?;

        let view = table.view().await;
        self.broadcaster
            .send_to_players(
                &view.players,
                &ServerMessage::TableState {
                    table: view.snapshot.clone(),
                },
            )
            .await;

        if view.snapshot.winner.is_some() {
            self.broadcaster
                .send_to_players(&view.players, &ServerMessage::GameEnd { table: view.snapshot })
                .await;
            self.broadcast_lobby().await;
            let removed = self.registry.lock().await.remove_finished_tables();
            tracing::debug!(?removed, "finished tables reclaimed");
        }
        Ok(())
    }

    /// Removes the player from `table_id` and notifies whoever is left.
    ///
    /// Returns `false` when there was nothing to vacate: the table is
    /// gone already (finished and reclaimed) or the player had left it.
    async fn vacate(&self, player_id: PlayerId, table_id: TableId) -> bool {
        let Some(table) = self.registry.lock().await.get_table(table_id) else {
            return false;
        };
        if let Err(e) = table.remove_player(player_id).await {
            tracing::debug!(%player_id, %table_id, error = %e, "nothing to vacate");
            return false;
        }

        let view = table.view().await;
        if view.players.is_empty() {
            self.registry.lock().await.remove_table_if_empty(table_id);
        } else {
            self.broadcaster
                .send_to_players(&view.players, &ServerMessage::TableState { table: view.snapshot })
                .await;
        }
        true
    }

    /// Undoes a seat taken by a join that could not complete.
    async fn release_seat(&self, player_id: PlayerId, table: &Table) {
        if let Err(e) = table.remove_player(player_id).await {
            tracing::debug!(%player_id, table_id = %table.id(), error = %e, "seat already released");
        }
    }

    async fn table(&self, table_id: TableId) -> Result<Arc<Table>, TableError> {
        self.registry
            .lock()
            .await
            .get_table(table_id)
            .ok_or(TableError::NotFound(table_id))
    }

    async fn lobby(&self) -> ServerMessage {
        ServerMessage::Tables {
            tables: self.registry.lock().await.list_tables_summary(),
        }
    }

    async fn broadcast_lobby(&self) {
        let lobby = self.lobby().await;
        self.broadcaster.broadcast(&lobby).await;
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
