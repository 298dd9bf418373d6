//! Per-connection handler: session setup, the read loop, and the
//! outbound writer.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Finish the WebSocket handshake (bounded by [`HANDSHAKE_TIMEOUT`]),
//!      derive the player id from the connection id and open a session
//!   2. Spawn a writer task draining the player's outbound queue
//!   3. Loop: receive frames → decode a `ClientCommand` → dispatch
//!   4. On close or error, the session guard runs the disconnect cascade

use std::sync::Arc;
use std::time::Duration;

use tictac_protocol::{ClientCommand, Codec, PlayerId, ServerMessage};
use tictac_transport::{Connection, Handshake, PendingWebSocket, WebSocketConnection};
use tokio::sync::mpsc;

use crate::TictacError;
use crate::server::ServerState;

/// How long a freshly accepted peer gets to complete the upgrade.
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Drop guard that disconnects a player when the handler exits.
///
/// Runs even if the handler panics. `Drop` is synchronous, so the async
/// cascade is spawned as its own task.
struct SessionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.dispatcher.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    pending: PendingWebSocket,
    state: Arc<ServerState<C>>,
) -> Result<(), TictacError> {
    let peer = pending.peer_addr();
    let conn = match tokio::time::timeout(HANDSHAKE_TIMEOUT, pending.complete()).await {
        Ok(conn) => Arc::new(conn?),
        Err(_) => {
            tracing::debug!(%peer, "handshake timed out");
            return Ok(());
        }
    };
    let conn_id = conn.id();
    let player_id = PlayerId::from(conn_id);

    let (tx, rx) = mpsc::unbounded_channel();
    state.dispatcher.connect(player_id, conn_id, tx).await?;
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, "player connected");

    let writer = tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        match state.codec.decode::<ClientCommand>(&data) {
            Ok(command) => {
                tracing::debug!(%player_id, ?command, "command received");
                state.dispatcher.dispatch(player_id, command).await;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "malformed message");
                state.dispatcher.reject(player_id, &e).await;
            }
        }
    }

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::trace!(%player_id, error = %e, "close after disconnect");
    }
    // _guard drops here → disconnect cascade fires.
    Ok(())
}

/// Drains the outbound queue onto the connection until either side
/// goes away.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(msg) = rx.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode notification");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, writer stopping");
            break;
        }
    }
}
