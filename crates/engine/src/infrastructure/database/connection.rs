//! Database connection management.
//!
//! One [`ConnectionManager`] owns at most one long-lived connection. Callers
//! that need a connection for a single operation go through
//! [`ConnectionManager::scoped_connection`], which lends the long-lived
//! connection when there is one and otherwise opens a transient connection
//! that is closed when the scope ends.

use std::ops::{Deref, DerefMut};

use sqlx::any::install_default_drivers;
use sqlx::AnyConnection;
use sqlx::{Any, Connection, Transaction};

use crate::infrastructure::config::{Backend, DatabaseConfig};
use crate::infrastructure::ports::RepoError;

/// Owner of the loader's database connection.
///
/// Not shareable between tasks: every operation takes `&mut self`, so two
/// callers can never interleave statements on the same connection.
pub struct ConnectionManager {
    config: DatabaseConfig,
    connection: Option<AnyConnection>,
}

impl ConnectionManager {
    pub fn new(config: DatabaseConfig) -> Self {
        install_default_drivers();
        Self {
            config,
            connection: None,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn backend(&self) -> Backend {
        self.config.backend()
    }

    /// Whether a long-lived connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Establish the long-lived connection, retrying with linear backoff.
    ///
    /// A held connection that still answers a ping is reused as-is. After
    /// failed attempt `n` the manager sleeps `n * backoff_step`; once every
    /// attempt has failed the last driver error is returned.
    pub async fn connect(&mut self) -> Result<(), RepoError> {
        if let Some(conn) = self.connection.as_mut() {
            if conn.ping().await.is_ok() {
                return Ok(());
            }
            tracing::warn!("Held database connection stopped responding, reconnecting");
            self.connection = None;
        }

        let retry = self.config.retry.clone();
        let target = self.config.redacted_target();
        let mut last_error = String::from("no connection attempt made");

        for attempt in 1..=retry.max_attempts {
            match open(&self.config).await {
                Ok(conn) => {
                    self.connection = Some(conn);
                    tracing::info!(database = %target, attempt, "Successfully connected to database");
                    return Ok(());
                }
                Err(e) => {
                    let delay = retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Database connection attempt failed"
                    );
                    last_error = e.to_string();
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::error!(
            database = %target,
            attempts = retry.max_attempts,
            "Failed to connect to database after all attempts"
        );
        Err(RepoError::Connection {
            attempts: retry.max_attempts,
            message: last_error,
        })
    }

    /// A connection for the duration of one operation.
    ///
    /// Lends the long-lived connection when one is held (the scope never
    /// closes it). Otherwise opens a transient connection owned by the
    /// scope; call [`ScopedConnection::finish`] to close it gracefully.
    pub async fn scoped_connection(&mut self) -> Result<ScopedConnection<'_>, RepoError> {
        match self.connection {
            Some(ref mut conn) => Ok(ScopedConnection::Shared(conn)),
            None => {
                let conn = open(&self.config).await.map_err(|e| {
                    tracing::error!(error = %e, "Database connection error");
                    RepoError::database("scoped_connection", e)
                })?;
                Ok(ScopedConnection::Transient(conn))
            }
        }
    }

    /// Release the long-lived connection. Safe to call when nothing is open.
    pub async fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "Error while closing database connection");
            }
            tracing::info!("Database connection closed");
        }
    }
}

async fn open(config: &DatabaseConfig) -> Result<AnyConnection, sqlx::Error> {
    AnyConnection::connect(&config.connection_url()).await
}

/// A connection lent for one operation.
pub enum ScopedConnection<'a> {
    /// The manager's long-lived connection; stays open after the scope.
    Shared(&'a mut AnyConnection),
    /// Opened for this scope only.
    Transient(AnyConnection),
}

impl ScopedConnection<'_> {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub fn conn(&mut self) -> &mut AnyConnection {
        match self {
            Self::Shared(conn) => conn,
            Self::Transient(conn) => conn,
        }
    }

    /// Start a transaction on this connection.
    ///
    /// Commit it explicitly; a transaction dropped without commit (early
    /// return, `?`, panic) is rolled back.
    pub async fn begin(&mut self) -> Result<Transaction<'_, Any>, RepoError> {
        self.conn().begin().await.map_err(|e| {
            tracing::error!(error = %e, "Could not start transaction");
            RepoError::database("begin", e)
        })
    }

    /// End the scope, closing the connection if the scope owns it.
    ///
    /// Dropping a transient scope without calling this still closes the
    /// socket, just without the protocol-level goodbye.
    pub async fn finish(self) {
        if let Self::Transient(conn) = self {
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "Error while closing transient connection");
            }
        }
    }
}

impl Deref for ScopedConnection<'_> {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Shared(conn) => conn,
            Self::Transient(conn) => conn,
        }
    }
}

impl DerefMut for ScopedConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn()
    }
}
