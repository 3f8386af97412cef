//! MySQL test harness for E2E testing.
//!
//! Provides testcontainer-based MySQL instance management for integration tests.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::AnyConnection;
use sqlx::Connection;
use testcontainers::{core::WaitFor, runners::AsyncRunner, ContainerAsync, GenericImage};

use crate::infrastructure::config::{DatabaseConfig, RetryConfig};
use crate::infrastructure::database::ConnectionManager;

pub const TEST_MYSQL_DATABASE: &str = "TTRPG_DB";
pub const TEST_MYSQL_USER: &str = "ttrpg_user";
pub const TEST_MYSQL_PASSWORD: &str = "testpassword";

/// MySQL test harness managing container lifecycle.
pub struct MySqlTestHarness {
    _container: ContainerAsync<GenericImage>,
    config: DatabaseConfig,
}

impl MySqlTestHarness {
    /// Start a new MySQL container and wait until it accepts connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the server never becomes reachable.
    pub async fn start(
        csv_directory: impl Into<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let container: ContainerAsync<GenericImage> = mysql_image().start().await;
        let port = container.get_host_port_ipv4(3306).await;

        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            user: TEST_MYSQL_USER.to_string(),
            password: TEST_MYSQL_PASSWORD.to_string(),
            database: TEST_MYSQL_DATABASE.to_string(),
            csv_directory: csv_directory.into(),
            // mysqld restarts once during first-boot initialisation
            retry: RetryConfig {
                max_attempts: 15,
                backoff_step: Duration::from_millis(500),
            },
            ..DatabaseConfig::default()
        };

        let mut manager = ConnectionManager::new(config.clone());
        manager.connect().await?;
        manager.close().await;

        Ok(Self {
            _container: container,
            config,
        })
    }

    pub fn config(&self) -> DatabaseConfig {
        self.config.clone()
    }

    pub fn manager(&self) -> ConnectionManager {
        ConnectionManager::new(self.config())
    }

    /// Run one statement on a fresh connection.
    pub async fn execute(&self, sql: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = AnyConnection::connect(&self.config.connection_url()).await?;
        sqlx::query(sql).execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    pub async fn count(&self, table: &str) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = AnyConnection::connect(&self.config.connection_url()).await?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM `{table}`"))
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(count)
    }
}

/// MySQL 8 image configured like the deployment database.
pub fn mysql_image() -> GenericImage {
    GenericImage::new("mysql", "8.0")
        .with_env_var("MYSQL_ROOT_PASSWORD", "rootpassword")
        .with_env_var("MYSQL_DATABASE", TEST_MYSQL_DATABASE)
        .with_env_var("MYSQL_USER", TEST_MYSQL_USER)
        .with_env_var("MYSQL_PASSWORD", TEST_MYSQL_PASSWORD)
        .with_exposed_port(3306)
        // Readiness is checked by the connection manager's own retries.
        .with_wait_for(WaitFor::seconds(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker (testcontainers)"]
    async fn test_mysql_harness_starts_and_connects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let harness = MySqlTestHarness::start(dir.path())
            .await
            .expect("Failed to start MySQL harness");

        harness
            .execute("CREATE TABLE probe (id INT PRIMARY KEY)")
            .await
            .expect("create table");
        assert_eq!(harness.count("probe").await.expect("count"), 0);
    }
}
