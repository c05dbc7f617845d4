use std::collections::BTreeMap;

use serde::Serialize;

use crate::infrastructure::static_data::StaticTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub loaded: usize,
    pub dropped: usize,
}

/// What the registry kept and dropped from each static table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    tables: BTreeMap<StaticTable, TableCounts>,
}

impl LoadReport {
    pub(crate) fn record_loaded(&mut self, table: StaticTable) {
        self.tables.entry(table).or_default().loaded += 1;
    }

    pub(crate) fn record_dropped(&mut self, table: StaticTable, count: usize) {
        self.tables.entry(table).or_default().dropped += count;
    }

    pub fn counts(&self, table: StaticTable) -> TableCounts {
        self.tables.get(&table).copied().unwrap_or_default()
    }

    pub fn total_dropped(&self) -> usize {
        self.tables.values().map(|c| c.dropped).sum()
    }

    pub fn log_summary(&self) {
        for table in StaticTable::ALL {
            let counts = self.counts(table);
            if counts.dropped > 0 {
                tracing::warn!(
                    table = %table,
                    loaded = counts.loaded,
                    dropped = counts.dropped,
                    "Static table loaded with dropped rows"
                );
            } else {
                tracing::info!(table = %table, loaded = counts.loaded, "Static table loaded");
            }
        }
    }
}
