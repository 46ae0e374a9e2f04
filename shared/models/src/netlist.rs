//! Raw component data as read from the KiCad intermediate netlist.

use serde::{Deserialize, Serialize};

/// A user-defined field attached to a schematic symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawField {
    pub name: String,
    pub value: String,
}

/// One `<comp>` entry of the netlist, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawComponent {
    pub reference: String,
    pub value: Option<String>,
    pub footprint: Option<String>,
    pub datasheet: Option<String>,
    pub fields: Vec<RawField>,
}

impl RawComponent {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = Some(footprint.into());
        self
    }

    pub fn with_datasheet(mut self, datasheet: impl Into<String>) -> Self {
        self.datasheet = Some(datasheet.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(RawField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Looks up a user field by name. The last occurrence wins, matching
    /// how fields are copied onto a record.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
