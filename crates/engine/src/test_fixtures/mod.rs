//! Shared helpers for loader tests.
//!
//! [`SqliteFixture`] gives each test its own SQLite database file and CSV
//! import directory inside a temp dir, so tests can run in parallel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::any::install_default_drivers;
use sqlx::AnyConnection;
use sqlx::Connection;
use tempfile::TempDir;

use crate::infrastructure::config::{DatabaseConfig, RetryConfig};
use crate::infrastructure::database::ConnectionManager;

/// Weapons table used across importer and seed tests.
pub const WEAPONS_DDL: &str = "CREATE TABLE weapons (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT NOT NULL, \
    damage INTEGER, \
    weight REAL)";

pub const ARMOR_DDL: &str = "CREATE TABLE armor (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT NOT NULL, \
    protection INTEGER)";

pub const ANOMALIES_DDL: &str = "CREATE TABLE anomalies (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT NOT NULL, \
    category TEXT, \
    danger_level INTEGER)";

/// A throwaway SQLite database plus CSV directory.
pub struct SqliteFixture {
    dir: TempDir,
    url: String,
}

impl SqliteFixture {
    /// Create the database and run `ddl` against it.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or any DDL statement fails.
    pub async fn new(ddl: &[&str]) -> Self {
        install_default_drivers();
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("reference.db").display());
        std::fs::create_dir_all(dir.path().join("import")).expect("create import dir");

        let fixture = Self { dir, url };
        for statement in ddl {
            fixture.execute(statement).await;
        }
        fixture
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.dir.path().join("import")
    }

    /// Config pointing at this database with millisecond retry backoff.
    pub fn config(&self) -> DatabaseConfig {
        let mut config = DatabaseConfig::from_url(self.url.clone(), self.csv_dir());
        config.retry = fast_retry(2);
        config
    }

    pub fn manager(&self) -> ConnectionManager {
        ConnectionManager::new(self.config())
    }

    /// Run one statement on a fresh connection.
    pub async fn execute(&self, sql: &str) {
        let mut conn = self.connect().await;
        sqlx::query(sql)
            .execute(&mut conn)
            .await
            .unwrap_or_else(|e| panic!("statement failed: {sql}: {e}"));
        conn.close().await.expect("close fixture connection");
    }

    pub async fn count(&self, table: &str) -> i64 {
        let mut conn = self.connect().await;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut conn)
            .await
            .expect("count rows");
        conn.close().await.expect("close fixture connection");
        count
    }

    /// First column of every row returned by `sql`, as optional text.
    pub async fn texts(&self, sql: &str) -> Vec<Option<String>> {
        let mut conn = self.connect().await;
        let values: Vec<Option<String>> = sqlx::query_scalar(sql)
            .fetch_all(&mut conn)
            .await
            .expect("fetch text column");
        conn.close().await.expect("close fixture connection");
        values
    }

    /// Write a CSV file under the import directory, creating subdirectories.
    pub fn write_csv(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.csv_dir().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create csv dir");
        }
        std::fs::write(&path, contents).expect("write csv");
        path
    }

    async fn connect(&self) -> AnyConnection {
        AnyConnection::connect(&self.url)
            .await
            .expect("connect to fixture database")
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        backoff_step: Duration::from_millis(10),
    }
}

/// A config whose every connection attempt fails.
pub fn unreachable_config(dir: &Path, max_attempts: u32) -> DatabaseConfig {
    let url = format!(
        "sqlite://{}?mode=ro",
        dir.join("missing").join("reference.db").display()
    );
    let mut config = DatabaseConfig::from_url(url, dir.join("import"));
    config.retry = fast_retry(max_attempts);
    config
}

/// `name,damage,weight` rows named `item-0001`, `item-0002`, ...
pub fn numbered_weapons_csv(rows: usize) -> String {
    let mut csv = String::from("name,damage,weight\n");
    for i in 1..=rows {
        csv.push_str(&format!("item-{i:04},{},{}.5\n", i % 50, i % 7));
    }
    csv
}
