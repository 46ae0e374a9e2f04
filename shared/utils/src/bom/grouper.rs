//! Component Grouper
//!
//! Turns raw netlist components into output rows and, when grouping is
//! enabled, folds duplicates into a single row.

use tracing::debug;

use crate::config::GroupingConfig;
use crate::error::{BomError, BomResult};
use kicad_bom_models::{
    BomTable, ComponentRecord, RawComponent, DATASHEET, FOOTPRINT, FOOTPRINT_LIB, REFERENCE, VALUE,
};

/// How a component was matched against an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    PartNumber,
    ValueFootprint,
}

/// What happened to one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    Added { row: usize },
    Merged { row: usize, kind: MatchKind },
}

/// Counts for a whole grouping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingSummary {
    pub components: usize,
    pub rows: usize,
    pub merged: usize,
}

/// Normalizer and duplicate grouper
pub struct BomGrouper {
    config: GroupingConfig,
}

impl BomGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Builds the candidate row for `component`, registering any new column
    /// names with the table schema in the order they are met.
    pub fn normalize(&self, component: &RawComponent, table: &mut BomTable) -> ComponentRecord {
        let mut record = ComponentRecord::new(component.reference.as_str());

        if let Some(value) = &component.value {
            record.insert(VALUE, value.as_str());
        }
        if let Some(footprint) = &component.footprint {
            match footprint.split_once(':') {
                Some((library, name)) if self.config.split_footprint_library => {
                    table.register_column(FOOTPRINT_LIB);
                    record.insert(FOOTPRINT_LIB, library);
                    record.insert(FOOTPRINT, name);
                }
                _ => {
                    record.insert(FOOTPRINT, footprint.as_str());
                }
            }
        }
        if let Some(datasheet) = &component.datasheet {
            record.insert(DATASHEET, datasheet.as_str());
        }

        for field in &component.fields {
            record.insert(field.name.as_str(), field.value.as_str());
            table.register_column(&field.name);
        }

        record
    }

    /// Adds one component to the table, merging it into an existing row when
    /// grouping is enabled and a duplicate is found.
    pub fn add(&self, component: &RawComponent, table: &mut BomTable) -> BomResult<GroupOutcome> {
        let candidate = self.normalize(component, table);

        if self.config.enabled {
            if let Some((row, kind)) = self.find_duplicate(&candidate, table.records()) {
                let existing = &mut table.records_mut()[row];
                Self::merge(existing, &candidate, kind)?;
                debug!(
                    "Grouped {} into row {} ({:?} match)",
                    candidate.reference(),
                    row,
                    kind
                );
                return Ok(GroupOutcome::Merged { row, kind });
            }
        }

        table.push(candidate);
        Ok(GroupOutcome::Added {
            row: table.len() - 1,
        })
    }

    /// Adds every component in input order
    pub fn add_all(
        &self,
        components: &[RawComponent],
        table: &mut BomTable,
    ) -> BomResult<GroupingSummary> {
        let mut summary = GroupingSummary::default();

        for component in components {
            summary.components += 1;
            if let GroupOutcome::Merged { .. } = self.add(component, table)? {
                summary.merged += 1;
            }
        }

        summary.rows = table.len();
        Ok(summary)
    }

    /// First existing row that `candidate` duplicates.
    ///
    /// When both rows carry a part number only the part numbers are compared,
    /// and the sentinel never matches. Otherwise value and footprint must
    /// both be equal.
    fn find_duplicate(
        &self,
        candidate: &ComponentRecord,
        records: &[ComponentRecord],
    ) -> Option<(usize, MatchKind)> {
        let field = self.config.part_number_field.as_str();
        let sentinel = self.config.no_part_sentinel.as_str();

        records.iter().enumerate().find_map(|(row, existing)| {
            match (candidate.get(field), existing.get(field)) {
                (Some(ours), Some(theirs)) => {
                    (ours == theirs && ours != sentinel).then_some((row, MatchKind::PartNumber))
                }
                _ => (existing.value() == candidate.value()
                    && existing.footprint() == candidate.footprint())
                .then_some((row, MatchKind::ValueFootprint)),
            }
        })
    }

    fn merge(existing: &mut ComponentRecord, candidate: &ComponentRecord, kind: MatchKind) -> BomResult<()> {
        // Row stays untouched if Count is unusable
        let count = existing.count().ok_or_else(|| {
            BomError::internal(format!("Row {} has a non-numeric Count", existing.reference()))
        })?;

        existing.append(REFERENCE, candidate.reference());

        if kind == MatchKind::PartNumber {
            if let Some(value) = candidate.value() {
                if existing.value() != Some(value) {
                    existing.append(VALUE, value);
                }
            }
        }

        existing.set_count(count + 1);
        Ok(())
    }
}
