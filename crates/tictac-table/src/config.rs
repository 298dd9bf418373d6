//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Default cap on tables that may wait for players at the same time.
pub const DEFAULT_MAX_WAITING_TABLES: usize = 20;

/// Configuration for the table registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// How many tables with fewer than two players may exist at once.
    /// Full and finished tables don't count against it.
    pub max_waiting_tables: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_waiting_tables: DEFAULT_MAX_WAITING_TABLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        assert_eq!(RegistryConfig::default().max_waiting_tables, 20);
    }
}
