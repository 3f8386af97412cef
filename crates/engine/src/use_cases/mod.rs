//! Use cases - User story orchestration.
//!
//! - `seed` - load empty reference tables from CSV at startup
//! - `browse` - paginated reads over the loaded reference tables

pub mod browse;
pub mod seed;

pub use browse::{BrowseError, BrowseReference, ReferencePage};
pub use seed::SeedOrchestrator;
