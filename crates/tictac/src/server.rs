//! `TictacServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → dispatcher, which
//! owns the sessions and the table registry.

use std::net::SocketAddr;
use std::sync::Arc;

use tictac_protocol::{Codec, JsonCodec};
use tictac_table::RegistryConfig;
use tictac_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{Dispatcher, ServerConfig, TictacError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), tictac::TictacError> {
/// let server = tictac::TictacServer::builder()
///     .bind("0.0.0.0:8765")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TictacServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
}

impl TictacServerBuilder {
    /// Creates a builder bound to `127.0.0.1:8765` with the default
    /// waiting-table cap.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8765".to_string(),
            registry_config: RegistryConfig::default(),
        }
    }

    /// Takes address and registry settings from a parsed [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.bind_addr())
            .registry_config(config.registry_config())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<TictacServer<JsonCodec>, TictacError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            dispatcher: Dispatcher::new(self.registry_config),
            codec: JsonCodec,
        });
        Ok(TictacServer { transport, state })
    }
}

impl Default for TictacServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct TictacServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl TictacServer<JsonCodec> {
    pub fn builder() -> TictacServerBuilder {
        TictacServerBuilder::new()
    }
}

impl<C: Codec> TictacServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TictacError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning a handler task per connection.
    ///
    /// Only the TCP accept happens here; each WebSocket handshake runs
    /// on the spawned task.
    ///
    /// Never returns on its own; callers stop it by dropping the future.
    pub async fn run(mut self) -> Result<(), TictacError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "tictac server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    // The handshake runs on the connection's own task.
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
