//! Backend E2E integration tests.
//!
//! These tests run the seed flow and the reference repository against a
//! real MySQL server (via testcontainers), the database the loader targets
//! in production.
//!
//! # Running E2E Tests
//!
//! ```bash
//! # Run all E2E tests (requires Docker)
//! cargo test -p stalker-engine --lib e2e_tests -- --ignored --test-threads=1
//! ```

mod mysql_test_harness;

pub use mysql_test_harness::*;
