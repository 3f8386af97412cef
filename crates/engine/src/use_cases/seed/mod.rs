//! Reference data seeding.
//!
//! One seed run loads every empty table from its CSV source(s) and leaves
//! populated tables alone, so running it at every startup is idempotent.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use futures_util::FutureExt;
use stalker_domain::{
    FailedImport, Identifier, MissingSource, SeedLayout, SeedReport, SeedSource,
    DEFAULT_BATCH_SIZE,
};

use crate::infrastructure::database::{ConnectionManager, SchemaInspector};
use crate::infrastructure::importers::CsvTableImporter;


/// Seeds empty tables from the CSV layout.
pub struct SeedOrchestrator<'a> {
    manager: &'a mut ConnectionManager,
    layout: SeedLayout,
    batch_size: usize,
}

impl<'a> SeedOrchestrator<'a> {
    pub fn new(manager: &'a mut ConnectionManager, layout: SeedLayout) -> Self {
        Self {
            manager,
            layout,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run one seed pass.
    ///
    /// Never fails: connection problems, missing files, failed imports and
    /// unexpected panics are logged and recorded in the report. The
    /// connection is closed before returning in every case.
    pub async fn ensure_seeded(&mut self) -> SeedReport {
        if let Err(e) = self.manager.connect().await {
            tracing::error!(
                error = %e,
                "Cannot ensure CSV data is loaded: database connection failed"
            );
            self.manager.close().await;
            return SeedReport::aborted(e.to_string());
        }

        let mut report = SeedReport::default();
        let outcome = AssertUnwindSafe(self.seed_tables(&mut report))
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            let message = panic_message(panic.as_ref());
            tracing::error!(error = %message, "Unexpected error while ensuring CSV data is loaded");
            report.aborted = Some(message);
        }

        self.manager.close().await;
        report
    }

    async fn seed_tables(&mut self, report: &mut SeedReport) {
        let tables = SchemaInspector::new(&mut *self.manager).list_tables().await;
        tracing::info!(count = tables.len(), "Found tables in database");
        report.tables_found = tables.len();

        for table in tables {
            if !SchemaInspector::new(&mut *self.manager).is_empty(&table).await {
                tracing::info!(table = %table, "Table already contains data, skipping");
                report.tables_skipped.push(table.into_inner());
                continue;
            }

            match self.layout.source_for(&table) {
                SeedSource::Single(path) => {
                    if !path.is_file() {
                        tracing::warn!(
                            table = %table,
                            file = %path.display(),
                            "Table is empty but no matching CSV file found"
                        );
                        report.missing_sources.push(missing(&table, path));
                        continue;
                    }
                    tracing::info!(table = %table, file = %path.display(), "Table is empty, loading data");
                    self.load(&table, &path, report).await;
                }
                SeedSource::Multi(paths) => {
                    tracing::info!(table = %table, files = paths.len(), "Table is empty, loading category files");
                    let mut loaded = 0usize;
                    for path in paths {
                        if !path.is_file() {
                            tracing::warn!(
                                table = %table,
                                file = %path.display(),
                                "Category file not found, skipping"
                            );
                            report.missing_sources.push(missing(&table, path));
                            continue;
                        }
                        if self.load(&table, &path, report).await {
                            loaded += 1;
                        }
                    }
                    tracing::info!(table = %table, loaded, "Finished loading category files");
                }
            }
        }

        tracing::info!(files = report.files_loaded, rows = report.rows_loaded, "Loaded data from CSV files");
    }

    async fn load(&mut self, table: &Identifier, path: &Path, report: &mut SeedReport) -> bool {
        let mut importer =
            CsvTableImporter::new(&mut *self.manager).with_batch_size(self.batch_size);
        match importer.import(path, table).await {
            Ok(summary) => {
                report.record_loaded(summary);
                true
            }
            Err(e) => {
                report.failed_imports.push(FailedImport {
                    table: table.to_string(),
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}

fn missing(table: &Identifier, path: PathBuf) -> MissingSource {
    MissingSource {
        table: table.to_string(),
        path,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "seed run panicked".to_string()
    }
}
