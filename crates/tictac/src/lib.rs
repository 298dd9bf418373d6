//! # tictac
//!
//! A multiplayer tic-tac-toe lobby server. Clients connect over
//! WebSockets, create or join two-seat tables, and play moves; the
//! server keeps every client's view of the lobby and of its own table
//! current.
//!
//! ```text
//! WebSocketTransport ─→ handler (per connection) ─→ Dispatcher
//!                           ↑                         │
//!                           └── Broadcaster ←─────────┘
//!                                            TableRegistry / SessionManager
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), tictac::TictacError> {
//! use tictac::{ServerConfig, TictacServerBuilder};
//!
//! let server = TictacServerBuilder::from_config(&ServerConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcast;
pub mod client;
mod config;
mod dispatcher;
mod error;
mod handler;
pub mod logging;
mod server;

pub use broadcast::{Broadcaster, PlayerSender};
pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use error::TictacError;
pub use server::{TictacServer, TictacServerBuilder};

/// Re-exports for writing servers and clients against this crate.
pub mod prelude {
    pub use crate::{Dispatcher, ServerConfig, TictacError, TictacServer, TictacServerBuilder};
    pub use tictac_protocol::{
        Cell, ClientCommand, Codec, JsonCodec, Mark, Outcome, PlayerId, ServerMessage, TableId,
        TableSnapshot, TableStatus, TableSummary,
    };
    pub use tictac_table::{RegistryConfig, TableError};
}
