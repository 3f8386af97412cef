//! Content importers for seeding reference tables.
//!
//! This module loads game reference data (weapons, armor, artifacts,
//! anomalies, ...) from CSV files into the relational schema.

mod csv_table;

pub use csv_table::{insert_statement, CsvTableImporter, ImportError};
