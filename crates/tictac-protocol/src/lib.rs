//! Wire protocol for the tic-tac-toe lobby server.
//!
//! - **Types** ([`ClientCommand`], [`ServerMessage`], [`TableSnapshot`],
//!   [`TableSummary`], ids): what travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (ClientCommand) → Dispatcher
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Cell, ClientCommand, Mark, Outcome, PlayerId, ServerMessage, TableId, TableSnapshot,
    TableStatus, TableSummary,
};
