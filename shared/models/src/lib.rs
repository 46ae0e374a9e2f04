//! # KiCad BOM Domain Models
//!
//! Core data structures shared by the netlist loader, the grouper, the
//! pricing enricher and the report writers.
//!
//! ## Key Models
//!
//! - **RawComponent**: a symbol as read from the intermediate netlist
//! - **ComponentRecord**: one output row, a map from column name to value
//! - **ColumnSchema**: the ordered, append-only list of output columns
//! - **BomTable**: the result set together with its schema

pub mod component;
pub mod schema;
pub mod table;
pub mod netlist;


pub use component::*;
pub use schema::*;
pub use table::*;
pub use netlist::*;
