//! CSV file to table importer.
//!
//! Streams a CSV file into an existing table in fixed-size batches. Only
//! header columns that also exist in the table are loaded; each batch is
//! committed on its own, so a failure part-way through leaves the earlier
//! batches in place.

use std::path::{Path, PathBuf};

use sqlx::AnyConnection;
use sqlx::Connection;
use stalker_domain::{
    ColumnMapping, DomainError, Identifier, ImportBatch, ImportSummary, RowValues,
    DEFAULT_BATCH_SIZE,
};
use thiserror::Error;

use crate::infrastructure::config::Backend;
use crate::infrastructure::database::{ConnectionManager, SchemaInspector};
use crate::infrastructure::ports::RepoError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No matching columns found for table {table} in {}", .path.display())]
    NoMatchingColumns { table: String, path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error loading data into {table}: {source}")]
    Insert {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Loads one CSV file into one table per call.
pub struct CsvTableImporter<'a> {
    manager: &'a mut ConnectionManager,
    batch_size: usize,
}

impl<'a> CsvTableImporter<'a> {
    pub fn new(manager: &'a mut ConnectionManager) -> Self {
        Self {
            manager,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Load `path` into `table`.
    ///
    /// Failures are logged here and returned; rows from batches committed
    /// before the failure stay in the table.
    pub async fn import(
        &mut self,
        path: &Path,
        table: &Identifier,
    ) -> Result<ImportSummary, ImportError> {
        let result = self.load(path, table).await;
        match &result {
            Ok(summary) => tracing::info!(
                table = %table,
                file = %path.display(),
                rows = summary.rows_loaded,
                batches = summary.batches_committed,
                "Successfully loaded rows from CSV"
            ),
            Err(e) => tracing::error!(
                table = %table,
                file = %path.display(),
                error = %e,
                "CSV import failed"
            ),
        }
        result
    }

    async fn load(&mut self, path: &Path, table: &Identifier) -> Result<ImportSummary, ImportError> {
        if !path.is_file() {
            return Err(ImportError::FileNotFound(path.to_path_buf()));
        }

        let descriptor = SchemaInspector::new(&mut *self.manager)
            .describe(table)
            .await;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mapping = descriptor.match_header(&header);
        if mapping.is_empty() {
            return Err(ImportError::NoMatchingColumns {
                table: table.to_string(),
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(
            table = %table,
            columns = ?mapping.columns().map(Identifier::as_str).collect::<Vec<_>>(),
            "Matched CSV header to table columns"
        );

        let statement = insert_statement(self.manager.backend(), &mapping);
        let mut batch = ImportBatch::new(mapping.width(), self.batch_size)?;
        let mut summary = ImportSummary {
            table: table.to_string(),
            rows_loaded: 0,
            batches_committed: 0,
        };

        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            if batch.push(mapping.extract(record.iter()))? {
                self.flush(&statement, &mut batch, &mut summary).await?;
            }
        }
        if !batch.is_empty() {
            self.flush(&statement, &mut batch, &mut summary).await?;
        }

        Ok(summary)
    }

    /// Write the buffered rows in one transaction and clear the buffer.
    async fn flush(
        &mut self,
        statement: &str,
        batch: &mut ImportBatch,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        let rows = batch.take();
        let row_count = rows.len() as u64;

        let mut scoped = self.manager.scoped_connection().await?;
        let result = insert_rows(scoped.conn(), statement, rows).await;
        scoped.finish().await;

        result.map_err(|source| ImportError::Insert {
            table: summary.table.clone(),
            source,
        })?;

        summary.rows_loaded += row_count;
        summary.batches_committed += 1;
        tracing::debug!(
            table = %summary.table,
            batch = summary.batches_committed,
            rows = summary.rows_loaded,
            "Committed batch"
        );
        Ok(())
    }
}

/// `INSERT INTO <table> (<columns>) VALUES (?, ...)` for a mapping.
pub fn insert_statement(backend: Backend, mapping: &ColumnMapping) -> String {
    let columns: Vec<String> = mapping.columns().map(|c| backend.quote(c)).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        backend.quote(mapping.table()),
        columns.join(", "),
        placeholders
    )
}

async fn insert_rows(
    conn: &mut AnyConnection,
    statement: &str,
    rows: Vec<RowValues>,
) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;
    for row in rows {
        let mut query = sqlx::query(statement);
        for value in row {
            query = query.bind(value);
        }
        query.execute(&mut *tx).await?;
    }
    tx.commit().await
}
