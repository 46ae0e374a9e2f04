//! Ordered, append-only set of output column names.

use serde::{Deserialize, Serialize};

use crate::component::DEFAULT_COLUMNS;

/// Output column order.
///
/// Starts with `Reference, Value, Footprint, Count, Datasheet` and only ever
/// grows at the end as user fields and distributor columns are discovered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `column` unless it is already known. Returns true if it was added.
    pub fn ensure(&mut self, column: &str) -> bool {
        if self.contains(column) {
            return false;
        }
        self.columns.push(column.to_string());
        true
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
