//! Repository port traits for database access.

use async_trait::async_trait;

use super::error::RepoError;
use super::types::{ColumnFilter, Relation, Row};

// =============================================================================
// Reference Data (seeded from CSV, read-only afterwards)
// =============================================================================

/// Read access to the reference tables (weapons, armor, artifacts, ...).
///
/// Table and column arguments are checked against the live schema; values
/// are always bound as parameters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepo: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>, RepoError>;

    async fn get_all(&self, table: &str, limit: u32, offset: u64) -> Result<Vec<Row>, RepoError>;

    async fn get_by_id(
        &self,
        table: &str,
        id_column: &str,
        id_value: &str,
    ) -> Result<Option<Row>, RepoError>;

    /// Substring match (`LIKE %term%`) on one column.
    async fn search(
        &self,
        table: &str,
        column: &str,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Row>, RepoError>;

    async fn count(&self, table: &str, filter: Option<ColumnFilter>) -> Result<u64, RepoError>;

    async fn get_related(
        &self,
        relation: Relation,
        id_value: &str,
        limit: u32,
    ) -> Result<Vec<Row>, RepoError>;

    /// Run one read-only statement (SELECT, SHOW, DESCRIBE, EXPLAIN, WITH).
    async fn run_read_query(&self, sql: &str, params: Vec<String>)
        -> Result<Vec<Row>, RepoError>;
}
