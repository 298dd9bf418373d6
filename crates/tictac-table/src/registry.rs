//! Table registry: creates, tracks, lists, and removes tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use tictac_protocol::{TableId, TableSummary};

use crate::{RegistryConfig, Table, TableError};

/// Owns the set of live tables.
///
/// The registry itself is not synchronized; the server keeps it behind
/// one mutex so every operation here is atomic with respect to the
/// others. It only looks at each table's published
/// [`TableInfo`](crate::TableInfo), never at the board or the table lock.
#[derive(Debug)]
pub struct TableRegistry {
    /// Live tables, ordered by id so listings are stable.
    tables: BTreeMap<TableId, Arc<Table>>,

    /// Next id to hand out. Only ever grows, so ids are never reused.
    next_id: u64,

    config: RegistryConfig,
}

impl TableRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            tables: BTreeMap::new(),
            next_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Creates a new empty table.
    ///
    /// # Errors
    /// [`TableError::CapacityExceeded`] when `max_waiting_tables` tables
    /// already have fewer than two players.
    pub fn create_table(&mut self) -> Result<Arc<Table>, TableError> {
        let limit = self.config.max_waiting_tables;
        if self.waiting_count() >= limit {
            tracing::debug!(limit, "table creation refused, lobby full");
            return Err(TableError::CapacityExceeded { limit });
        }

        let table_id = TableId(self.next_id);
        self.next_id += 1;
        let table = Arc::new(Table::new(table_id));
        self.tables.insert(table_id, Arc::clone(&table));
        tracing::info!(%table_id, "table created");
        Ok(table)
    }

    /// Removes a table. Absent ids are a no-op.
    pub fn remove_table(&mut self, table_id: TableId) -> Option<Arc<Table>> {
        let removed = self.tables.remove(&table_id);
        if removed.is_some() {
            tracing::info!(%table_id, "table removed");
        }
        removed
    }

    /// Removes a table only if nobody sits at it right now.
    ///
    /// Returns `true` if the table was removed.
    pub fn remove_table_if_empty(&mut self, table_id: TableId) -> bool {
        let empty = self
            .tables
            .get(&table_id)
            .is_some_and(|t| t.info().player_count == 0);
        empty && self.remove_table(table_id).is_some()
    }

    pub fn get_table(&self, table_id: TableId) -> Option<Arc<Table>> {
        self.tables.get(&table_id).cloned()
    }

    /// The lobby listing: every live table without a result, in id order.
    pub fn list_tables_summary(&self) -> Vec<TableSummary> {
        self.tables
            .values()
            .map(|t| t.info())
            .filter(|info| !info.is_finished())
            .map(|info| info.summary())
            .collect()
    }

    /// Drops every table that has a winner or a draw recorded.
    ///
    /// Returns the ids that were removed.
    pub fn remove_finished_tables(&mut self) -> Vec<TableId> {
        let finished: Vec<TableId> = self
            .tables
            .values()
            .filter(|t| t.info().is_finished())
            .map(|t| t.id())
            .collect();
        for table_id in &finished {
            self.tables.remove(table_id);
            tracing::info!(%table_id, "finished table removed");
        }
        finished
    }

    /// Tables with fewer than two players.
    pub fn waiting_count(&self) -> usize {
        self.tables.values().filter(|t| t.info().is_waiting()).count()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_ids(&self) -> Vec<TableId> {
        self.tables.keys().copied().collect()
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
