//! Component domain models for the BOM export.
//!
//! A `ComponentRecord` is one output row: a flat map from column name to
//! string value. Absence of a column is distinct from an empty value, which
//! is what lets the CSV writer render an empty cell while the XML writer
//! omits the element.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const REFERENCE: &str = "Reference";
pub const VALUE: &str = "Value";
pub const FOOTPRINT: &str = "Footprint";
pub const COUNT: &str = "Count";
pub const DATASHEET: &str = "Datasheet";
pub const FOOTPRINT_LIB: &str = "FootprintLib";

/// Columns every schema starts with, in output order.
pub const DEFAULT_COLUMNS: [&str; 5] = [REFERENCE, VALUE, FOOTPRINT, COUNT, DATASHEET];

/// Separator used when merged components are joined into one row
pub const MERGE_SEPARATOR: char = ';';

/// One row of the bill of materials, possibly covering several designators.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentRecord {
    fields: HashMap<String, String>,
}

impl ComponentRecord {
    /// Creates a record for a single designator with `Count` = "1"
    pub fn new(reference: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(REFERENCE.to_string(), reference.into());
        fields.insert(COUNT.to_string(), "1".to_string());
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Sets a column value, returning the previous one if any
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(column.into(), value.into())
    }

    pub fn reference(&self) -> &str {
        self.get(REFERENCE).unwrap_or_default()
    }

    pub fn value(&self) -> Option<&str> {
        self.get(VALUE)
    }

    pub fn footprint(&self) -> Option<&str> {
        self.get(FOOTPRINT)
    }

    /// Number of physical parts this row stands for.
    ///
    /// Returns `None` if the `Count` column is missing or not an integer.
    pub fn count(&self) -> Option<u32> {
        self.get(COUNT)?.trim().parse().ok()
    }

    pub fn set_count(&mut self, count: u32) {
        self.insert(COUNT, count.to_string());
    }

    /// Appends `value` to an existing column using the merge separator.
    /// A missing column is simply set.
    pub fn append(&mut self, column: &str, value: &str) {
        match self.fields.get_mut(column) {
            Some(existing) => {
                existing.push(MERGE_SEPARATOR);
                existing.push_str(value);
            }
            None => {
                self.fields.insert(column.to_string(), value.to_string());
            }
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
