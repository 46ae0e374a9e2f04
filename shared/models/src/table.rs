//! The pipeline context: result set plus the schema that describes it.

use serde::{Deserialize, Serialize};

use crate::component::ComponentRecord;
use crate::schema::ColumnSchema;

/// Result set of the export together with its accreting column schema.
///
/// Every stage that can discover new columns goes through this type so the
/// schema always covers every key of every record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BomTable {
    schema: ColumnSchema,
    records: Vec<ComponentRecord>,
}

impl BomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    /// Mutable access to the rows.
    ///
    /// Callers may only write columns that are already registered; use
    /// [`BomTable::set`] for anything new.
    pub fn records_mut(&mut self) -> &mut [ComponentRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registers a column name, appending it to the schema if unseen
    pub fn register_column(&mut self, column: &str) -> bool {
        self.schema.ensure(column)
    }

    /// Appends a record.
    ///
    /// Columns keep discovery order only if the caller registers them with
    /// [`BomTable::register_column`] as they are found. A record has no
    /// column order of its own, so anything still unregistered here is
    /// appended in name order.
    pub fn push(&mut self, record: ComponentRecord) {
        let mut unknown: Vec<&str> = record
            .columns()
            .filter(|c| !self.schema.contains(c))
            .collect();
        unknown.sort_unstable();
        for column in unknown {
            self.schema.ensure(column);
        }
        self.records.push(record);
    }

    /// Writes `column` on row `index`, registering the column first.
    /// Returns false if the row does not exist.
    pub fn set(&mut self, index: usize, column: &str, value: impl Into<String>) -> bool {
        let Some(record) = self.records.get_mut(index) else {
            return false;
        };
        self.schema.ensure(column);
        record.insert(column, value);
        true
    }

    /// True when every key of every record is part of the schema
    pub fn schema_covers_records(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.columns().all(|c| self.schema.contains(c)))
    }
}
