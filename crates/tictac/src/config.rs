//! Server configuration from the command line and environment.

use clap::Parser;
use tictac_table::{DEFAULT_MAX_WAITING_TABLES, RegistryConfig};

/// Command-line arguments for `tictac-server`.
///
/// Every flag can also be set through its environment variable; an
/// explicit flag wins.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tictac-server", version, about = "Multiplayer tic-tac-toe lobby server")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "TICTAC_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "TICTAC_PORT", default_value_t = 8765)]
    pub port: u16,

    /// How many tables may wait for players at once before table
    /// creation is refused.
    #[arg(
        long,
        env = "TICTAC_MAX_WAITING_TABLES",
        default_value_t = DEFAULT_MAX_WAITING_TABLES,
        value_parser = parse_waiting_cap,
    )]
    pub max_waiting_tables: usize,
}

impl ServerConfig {
    /// `host:port`, ready for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_waiting_tables: self.max_waiting_tables,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            max_waiting_tables: DEFAULT_MAX_WAITING_TABLES,
        }
    }
}

fn parse_waiting_cap(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
