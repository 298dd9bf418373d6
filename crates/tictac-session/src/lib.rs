//! Session tracking for the tic-tac-toe lobby server.
//!
//! A session is the server's record of one live connection: which
//! player it is and which table, if any, that player sits at. Sessions
//! are created on connect and destroyed on disconnect; there is no
//! resumption.
//!
//! ```text
//! Dispatcher (above)  ← asks which table a player is at
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol / Transport (below)  ← PlayerId, TableId, ConnectionId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
