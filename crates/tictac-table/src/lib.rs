//! Table lifecycle for the tic-tac-toe lobby server.
//!
//! # Key types
//!
//! - [`Table`]: one game with its board, seats, turn and result. Internally locked.
//! - [`TableRegistry`]: the live set of tables and the creation cap.
//! - [`Board`]: the 3×3 grid and win detection.
//! - [`TableError`]: everything a table command can be refused for.

mod board;
mod config;
mod error;
mod registry;
mod table;

pub use board::{Board, CELLS, LINES};
pub use config::{DEFAULT_MAX_WAITING_TABLES, RegistryConfig};
pub use error::{MoveRejection, TableError};
pub use registry::TableRegistry;
pub use table::{MAX_PLAYERS, Table, TableInfo, TableView};
