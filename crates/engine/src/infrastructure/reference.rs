//! SQL-backed reference data repository.

use async_trait::async_trait;
use sqlx::AnyConnection;
use sqlx::Connection;
use stalker_domain::{Identifier, TableDescriptor};
use tokio::sync::Mutex;

use crate::infrastructure::database::{row_to_json, ConnectionManager, SchemaInspector};
use crate::infrastructure::ports::{ColumnFilter, Relation, ReferenceRepo, RepoError, Row};

/// Leading keywords accepted by [`ReferenceRepo::run_read_query`].
const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH"];

#[derive(Debug, Clone)]
enum BindValue {
    Text(String),
    Int(i64),
}

/// [`ReferenceRepo`] over the loader's connection manager.
///
/// Requests are serialised on the manager's single connection.
pub struct SqlReferenceRepo {
    manager: Mutex<ConnectionManager>,
}

impl SqlReferenceRepo {
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager: Mutex::new(manager),
        }
    }

    /// Open the long-lived connection (with the configured retries).
    ///
    /// Optional: without it every request opens a transient connection.
    pub async fn connect(&self) -> Result<(), RepoError> {
        self.manager.lock().await.connect().await
    }

    pub async fn close(&self) {
        self.manager.lock().await.close().await;
    }

    async fn fetch(
        manager: &mut ConnectionManager,
        operation: &'static str,
        sql: &str,
        params: Vec<BindValue>,
    ) -> Result<Vec<Row>, RepoError> {
        let mut scoped = manager.scoped_connection().await?;
        let result = fetch_rows(scoped.conn(), sql, params).await;
        scoped.finish().await;

        result.map_err(|e| {
            tracing::error!(operation, error = %e, "Reference query failed");
            RepoError::database(operation, e)
        })
    }
}

/// Validate a table name and check it exists, returning its columns.
async fn resolve_table(
    manager: &mut ConnectionManager,
    table: &str,
) -> Result<TableDescriptor, RepoError> {
    let name = Identifier::new(table)?;
    let mut inspector = SchemaInspector::new(manager);
    if !inspector.fetch_tables().await?.contains(&name) {
        return Err(RepoError::not_found("Table", table));
    }
    let columns = inspector.fetch_columns(&name).await?;
    Ok(TableDescriptor::new(name, columns))
}

fn resolve_column(table: &TableDescriptor, column: &str) -> Result<Identifier, RepoError> {
    let candidate = Identifier::new(column)?;
    table
        .column(candidate.as_str())
        .cloned()
        .ok_or_else(|| RepoError::not_found("Column", format!("{}.{}", table.name(), column)))
}

/// Check that `sql` is one read-only statement and strip a trailing `;`.
pub fn ensure_read_only(sql: &str) -> Result<&str, RepoError> {
    let statement = sql.trim().trim_end_matches(';').trim_end();
    if statement.is_empty() {
        return Err(RepoError::ReadOnlyViolation("empty statement".to_string()));
    }
    if statement.contains(';') {
        return Err(RepoError::ReadOnlyViolation(
            "multiple statements".to_string(),
        ));
    }

    let keyword = statement
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    if READ_ONLY_KEYWORDS.contains(&keyword.as_str()) {
        Ok(statement)
    } else {
        Err(RepoError::ReadOnlyViolation(format!(
            "statement starts with {keyword}"
        )))
    }
}

async fn fetch_rows(
    conn: &mut AnyConnection,
    sql: &str,
    params: Vec<BindValue>,
) -> Result<Vec<Row>, sqlx::Error> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            BindValue::Text(value) => query.bind(value),
            BindValue::Int(value) => query.bind(value),
        };
    }
    let rows = query.fetch_all(conn).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

fn to_i64(value: impl TryInto<i64>) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

#[async_trait]
impl ReferenceRepo for SqlReferenceRepo {
    async fn list_tables(&self) -> Result<Vec<String>, RepoError> {
        let mut manager = self.manager.lock().await;
        let tables = SchemaInspector::new(&mut manager).fetch_tables().await?;
        Ok(tables.into_iter().map(Identifier::into_inner).collect())
    }

    async fn get_all(&self, table: &str, limit: u32, offset: u64) -> Result<Vec<Row>, RepoError> {
        let mut manager = self.manager.lock().await;
        let descriptor = resolve_table(&mut manager, table).await?;
        let backend = manager.backend();

        let sql = format!(
            "SELECT * FROM {} LIMIT ? OFFSET ?",
            backend.quote(descriptor.name())
        );
        Self::fetch(
            &mut manager,
            "get_all",
            &sql,
            vec![BindValue::Int(i64::from(limit)), BindValue::Int(to_i64(offset))],
        )
        .await
    }

    async fn get_by_id(
        &self,
        table: &str,
        id_column: &str,
        id_value: &str,
    ) -> Result<Option<Row>, RepoError> {
        let mut manager = self.manager.lock().await;
        let descriptor = resolve_table(&mut manager, table).await?;
        let column = resolve_column(&descriptor, id_column)?;
        let backend = manager.backend();

        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? LIMIT 1",
            backend.quote(descriptor.name()),
            backend.quote(&column)
        );
        let rows = Self::fetch(
            &mut manager,
            "get_by_id",
            &sql,
            vec![BindValue::Text(id_value.to_string())],
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    async fn search(
        &self,
        table: &str,
        column: &str,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Row>, RepoError> {
        let mut manager = self.manager.lock().await;
        let descriptor = resolve_table(&mut manager, table).await?;
        let column = resolve_column(&descriptor, column)?;
        let backend = manager.backend();

        let sql = format!(
            "SELECT * FROM {} WHERE {} LIKE ? LIMIT ?",
            backend.quote(descriptor.name()),
            backend.quote(&column)
        );
        Self::fetch(
            &mut manager,
            "search",
            &sql,
            vec![
                BindValue::Text(format!("%{term}%")),
                BindValue::Int(i64::from(limit)),
            ],
        )
        .await
    }

    async fn count(&self, table: &str, filter: Option<ColumnFilter>) -> Result<u64, RepoError> {
        let mut manager = self.manager.lock().await;
        let descriptor = resolve_table(&mut manager, table).await?;
        let backend = manager.backend();

        let (sql, params) = match filter {
            None => (
                format!("SELECT COUNT(*) AS count FROM {}", backend.quote(descriptor.name())),
                Vec::new(),
            ),
            Some(filter) => {
                let column = resolve_column(&descriptor, &filter.column)?;
                (
                    format!(
                        "SELECT COUNT(*) AS count FROM {} WHERE {} = ?",
                        backend.quote(descriptor.name()),
                        backend.quote(&column)
                    ),
                    vec![BindValue::Text(filter.value)],
                )
            }
        };

        let rows = Self::fetch(&mut manager, "count", &sql, params).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    async fn get_related(
        &self,
        relation: Relation,
        id_value: &str,
        limit: u32,
    ) -> Result<Vec<Row>, RepoError> {
        let mut manager = self.manager.lock().await;
        let parent = resolve_table(&mut manager, &relation.table).await?;
        let parent_id = resolve_column(&parent, "id")?;
        let child = resolve_table(&mut manager, &relation.foreign_table).await?;
        let foreign_key = resolve_column(&child, &relation.foreign_key)?;
        let backend = manager.backend();

        let parent_table = backend.quote(parent.name());
        let child_table = backend.quote(child.name());
        let sql = format!(
            "SELECT {child_table}.* FROM {child_table} \
             JOIN {parent_table} ON {child_table}.{fk} = {parent_table}.{pk} \
             WHERE {parent_table}.{pk} = ? LIMIT ?",
            fk = backend.quote(&foreign_key),
            pk = backend.quote(&parent_id),
        );
        Self::fetch(
            &mut manager,
            "get_related",
            &sql,
            vec![
                BindValue::Text(id_value.to_string()),
                BindValue::Int(i64::from(limit)),
            ],
        )
        .await
    }

    async fn run_read_query(
        &self,
        sql: &str,
        params: Vec<String>,
    ) -> Result<Vec<Row>, RepoError> {
        let statement = ensure_read_only(sql)?;
        let mut manager = self.manager.lock().await;

        let mut scoped = manager.scoped_connection().await?;
        let result = async {
            // Always rolled back: nothing run through here may persist.
            let mut tx = scoped.conn().begin().await?;
            let mut query = sqlx::query(statement);
            for param in params {
                query = query.bind(param);
            }
            let rows = query.fetch_all(&mut *tx).await?;
            tx.rollback().await?;
            Ok::<_, sqlx::Error>(rows.iter().map(row_to_json).collect::<Vec<_>>())
        }
        .await;
        scoped.finish().await;

        result.map_err(|e| {
            tracing::error!(error = %e, "Ad hoc read query failed");
            RepoError::database("run_read_query", e)
        })
    }
}
