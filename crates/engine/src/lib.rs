//! Stalker TTRPG Engine library.
//!
//! Server-side reference data handling for the companion app.
//!
//! ## Structure
//!
//! - `use_cases/` - seeding and browsing of reference tables
//! - `infrastructure/` - database access, CSV import, configuration (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

/// E2E integration tests using real MySQL via testcontainers.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
