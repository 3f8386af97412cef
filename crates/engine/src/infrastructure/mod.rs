//! Infrastructure implementations.
//!
//! Contains the database adapters behind the port traits, plus the CSV
//! importer and configuration they share.

pub mod config;
pub mod database;
pub mod importers;
pub mod ports;
pub mod reference;
