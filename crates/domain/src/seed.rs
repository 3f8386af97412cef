//! Where seed files live and what a seed run did.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::identifier::Identifier;

pub const CSV_EXTENSION: &str = "csv";

/// A table whose seed data is split over several files in its own
/// subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiFileCategory {
    pub table: String,
    pub subdirectory: String,
    /// File names, loaded in this order.
    pub files: Vec<String>,
}

impl MultiFileCategory {
    /// Anomaly data is kept as one file per anomaly family.
    pub fn anomalies() -> Self {
        Self {
            table: "anomalies".to_string(),
            subdirectory: "anomalies".to_string(),
            files: ["gravity", "electric", "thermal", "toxic", "special"]
                .iter()
                .map(|stem| format!("{stem}.{CSV_EXTENSION}"))
                .collect(),
        }
    }
}

/// The CSV file(s) backing one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Single(PathBuf),
    Multi(Vec<PathBuf>),
}

/// Seed file layout under the import directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedLayout {
    csv_directory: PathBuf,
    categories: Vec<MultiFileCategory>,
}

impl SeedLayout {
    /// Layout with the built-in multi-file categories.
    pub fn new(csv_directory: impl Into<PathBuf>) -> Self {
        Self {
            csv_directory: csv_directory.into(),
            categories: vec![MultiFileCategory::anomalies()],
        }
    }

    /// Layout where every table maps to exactly one file.
    pub fn flat(csv_directory: impl Into<PathBuf>) -> Self {
        Self {
            csv_directory: csv_directory.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: MultiFileCategory) -> Self {
        self.categories.retain(|c| c.table != category.table);
        self.categories.push(category);
        self
    }

    pub fn csv_directory(&self) -> &Path {
        &self.csv_directory
    }

    pub fn categories(&self) -> &[MultiFileCategory] {
        &self.categories
    }

    /// Resolve the source file(s) for a table. Existence is not checked.
    pub fn source_for(&self, table: &Identifier) -> SeedSource {
        match self.categories.iter().find(|c| table == c.table.as_str()) {
            Some(category) => {
                let dir = self.csv_directory.join(&category.subdirectory);
                SeedSource::Multi(category.files.iter().map(|f| dir.join(f)).collect())
            }
            None => SeedSource::Single(
                self.csv_directory
                    .join(format!("{}.{CSV_EXTENSION}", table.as_str())),
            ),
        }
    }
}

/// Result of loading one CSV file into one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub table: String,
    pub rows_loaded: u64,
    pub batches_committed: u64,
}

/// A table left empty because its source file does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSource {
    pub table: String,
    pub path: PathBuf,
}

/// A source file that exists but could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedImport {
    pub table: String,
    pub path: PathBuf,
    pub message: String,
}

/// Everything one seed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub tables_found: usize,
    pub files_loaded: usize,
    pub rows_loaded: u64,
    pub tables_skipped: Vec<String>,
    pub loaded: Vec<ImportSummary>,
    pub missing_sources: Vec<MissingSource>,
    pub failed_imports: Vec<FailedImport>,
    /// Set when the run stopped early (no connection, or an unexpected error).
    pub aborted: Option<String>,
}

impl SeedReport {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn record_loaded(&mut self, summary: ImportSummary) {
        self.files_loaded += 1;
        self.rows_loaded += summary.rows_loaded;
        self.loaded.push(summary);
    }

    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.failed_imports.is_empty()
    }
}
