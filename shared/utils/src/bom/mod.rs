//! BOM (Bill of Materials) Processing Module
//!
//! Reads a KiCad intermediate netlist, checks it, groups components into
//! rows and writes the CSV/XML reports.

pub mod loader;
pub mod validator;
pub mod grouper;
pub mod writer;

pub use loader::{NetlistLoader, ParsedNetlist};
pub use validator::{NetlistValidator, ValidationResult};
pub use grouper::{BomGrouper, GroupOutcome, GroupingSummary, MatchKind};
pub use writer::{xml_tag, OutputPaths, ReportWriter};
