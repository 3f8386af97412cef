//! Live schema inspection.
//!
//! Descriptors are read fresh on every call. The `list_*`/`is_empty`
//! methods never fail: errors are logged and degrade to "no tables", "no
//! columns" and "empty" respectively. The `fetch_*` variants return the
//! error instead, for callers that must tell "missing" from "unreachable".

use sqlx::AnyConnection;
use stalker_domain::{Identifier, TableDescriptor};

use super::connection::ConnectionManager;
use crate::infrastructure::config::Backend;
use crate::infrastructure::ports::RepoError;

pub struct SchemaInspector<'a> {
    manager: &'a mut ConnectionManager,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(manager: &'a mut ConnectionManager) -> Self {
        Self { manager }
    }

    /// All base tables, sorted by name. Empty on error.
    pub async fn list_tables(&mut self) -> Vec<Identifier> {
        match self.fetch_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                tracing::error!(error = %e, "Error getting tables");
                Vec::new()
            }
        }
    }

    /// Column names in ordinal order. Empty on error.
    pub async fn list_columns(&mut self, table: &Identifier) -> Vec<Identifier> {
        match self.fetch_columns(table).await {
            Ok(columns) => columns,
            Err(e) => {
                tracing::error!(table = %table, error = %e, "Error getting column names");
                Vec::new()
            }
        }
    }

    pub async fn describe(&mut self, table: &Identifier) -> TableDescriptor {
        let columns = self.list_columns(table).await;
        TableDescriptor::new(table.clone(), columns)
    }

    /// Whether the table has no rows.
    ///
    /// Returns `true` when the count cannot be read, so a table that may be
    /// empty gets another load attempt rather than being skipped.
    pub async fn is_empty(&mut self, table: &Identifier) -> bool {
        match self.count_rows(table).await {
            Ok(count) => count == 0,
            Err(e) => {
                tracing::error!(table = %table, error = %e, "Error checking if table is empty");
                true
            }
        }
    }

    pub async fn fetch_tables(&mut self) -> Result<Vec<Identifier>, RepoError> {
        let sql = match self.manager.backend() {
            Backend::MySql => {
                "SELECT CAST(table_name AS CHAR) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
                 ORDER BY table_name"
            }
            Backend::Sqlite => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name"
            }
        };

        let mut scoped = self.manager.scoped_connection().await?;
        let result = query_names(scoped.conn(), sql, None).await;
        scoped.finish().await;

        let names = result.map_err(|e| RepoError::database("list_tables", e))?;
        Ok(to_identifiers(names, "table"))
    }

    pub async fn fetch_columns(&mut self, table: &Identifier) -> Result<Vec<Identifier>, RepoError> {
        let sql = match self.manager.backend() {
            Backend::MySql => {
                "SELECT CAST(column_name AS CHAR) FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position"
            }
            Backend::Sqlite => "SELECT name FROM pragma_table_info(?) ORDER BY cid",
        };

        let mut scoped = self.manager.scoped_connection().await?;
        let result = query_names(scoped.conn(), sql, Some(table.as_str())).await;
        scoped.finish().await;

        let names = result.map_err(|e| RepoError::database("list_columns", e))?;
        Ok(to_identifiers(names, "column"))
    }

    pub async fn count_rows(&mut self, table: &Identifier) -> Result<u64, RepoError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.manager.backend().quote(table));

        let mut scoped = self.manager.scoped_connection().await?;
        let result: Result<i64, sqlx::Error> =
            sqlx::query_scalar(&sql).fetch_one(scoped.conn()).await;
        scoped.finish().await;

        let count = result.map_err(|e| RepoError::database("count_rows", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

async fn query_names(
    conn: &mut AnyConnection,
    sql: &str,
    param: Option<&str>,
) -> Result<Vec<String>, sqlx::Error> {
    let mut query = sqlx::query_scalar(sql);
    if let Some(param) = param {
        query = query.bind(param.to_string());
    }
    query.fetch_all(conn).await
}

fn to_identifiers(names: Vec<String>, kind: &'static str) -> Vec<Identifier> {
    names
        .into_iter()
        .filter_map(|name| match Identifier::new(name) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                tracing::warn!(kind, error = %e, "Skipping name that is not a plain identifier");
                None
            }
        })
        .collect()
}
