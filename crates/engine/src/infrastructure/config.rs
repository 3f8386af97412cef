//! Database and seed configuration.
//!
//! Values come from the environment (after `.env` files are loaded by the
//! binary), with defaults matching the docker-compose deployment.

use std::path::PathBuf;
use std::time::Duration;

use stalker_domain::DEFAULT_BATCH_SIZE;
use url::Url;

pub const DEFAULT_HOST: &str = "stalker-ttrpg_database_1";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "ttrpg_user";
pub const DEFAULT_PASSWORD: &str = "secretpass";
pub const DEFAULT_DATABASE: &str = "TTRPG_DB";
pub const DEFAULT_CSV_DIRECTORY: &str = "/app/data/import";

/// SQL dialect of the configured database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    /// Detect the backend from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Quote a validated identifier for this dialect.
    pub fn quote(&self, identifier: &stalker_domain::Identifier) -> String {
        match self {
            Self::MySql => format!("`{identifier}`"),
            Self::Sqlite => format!("\"{identifier}\""),
        }
    }
}

/// Linear backoff for the initial connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total connect attempts before giving up.
    pub max_attempts: u32,
    /// Delay after failed attempt `n` is `n * backoff_step`.
    pub backoff_step: Duration,
}

impl RetryConfig {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_step: Duration::from_secs(3),
        }
    }
}

/// Where to connect and where seed files live.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Full connection URL; overrides the MySQL fields above when set.
    pub url: Option<String>,
    pub csv_directory: PathBuf,
    pub retry: RetryConfig,
    pub batch_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            url: None,
            csv_directory: PathBuf::from(DEFAULT_CSV_DIRECTORY),
            retry: RetryConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DatabaseConfig {
    /// Config for an explicit connection URL (e.g. `sqlite:/tmp/ref.db`).
    pub fn from_url(url: impl Into<String>, csv_directory: impl Into<PathBuf>) -> Self {
        Self {
            url: Some(url.into()),
            csv_directory: csv_directory.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - DATABASE_URL: full URL override (`mysql://...` or `sqlite:...`)
    /// - DB_HOST, DB_PORT, DB_USER, MYSQL_PASSWORD, DB_NAME
    /// - CSV_IMPORT_DIR: seed file root
    /// - DB_CONNECT_ATTEMPTS, DB_CONNECT_BACKOFF_SECS
    /// - SEED_BATCH_SIZE
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let retry = RetryConfig {
            max_attempts: parse_or(&lookup, "DB_CONNECT_ATTEMPTS", defaults.retry.max_attempts)
                .max(1),
            backoff_step: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_BACKOFF_SECS",
                defaults.retry.backoff_step.as_secs(),
            )),
        };

        Self {
            host: text("DB_HOST", defaults.host),
            port: parse_or(&lookup, "DB_PORT", defaults.port),
            user: text("DB_USER", defaults.user),
            password: text("MYSQL_PASSWORD", defaults.password),
            database: text("DB_NAME", defaults.database),
            url: lookup("DATABASE_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            csv_directory: PathBuf::from(text(
                "CSV_IMPORT_DIR",
                defaults.csv_directory.display().to_string(),
            )),
            retry,
            batch_size: parse_or(&lookup, "SEED_BATCH_SIZE", defaults.batch_size).max(1),
        }
    }

    /// The URL handed to the driver.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let base = format!("mysql://{}:{}/{}", self.host, self.port, self.database);
        match Url::parse(&base) {
            Ok(mut url) => {
                // set_username/set_password percent-encode; they only fail for
                // URLs without a host, which this one always has.
                let _ = url.set_username(&self.user);
                let _ = url.set_password(Some(&self.password));
                url.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, host = %self.host, "Could not build MySQL URL from parts");
                base
            }
        }
    }

    pub fn backend(&self) -> Backend {
        self.url
            .as_deref()
            .and_then(Backend::from_url)
            .unwrap_or(Backend::MySql)
    }

    /// Connection target for logs, without credentials.
    pub fn redacted_target(&self) -> String {
        match &self.url {
            Some(url) => match Url::parse(url) {
                Ok(mut parsed) if parsed.password().is_some() => {
                    let _ = parsed.set_password(Some("***"));
                    parsed.to_string()
                }
                _ => url.clone(),
            },
            None => format!("mysql://{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, val = %val, default = %default, "Invalid value, using default");
                default
            }
        },
        None => default,
    }
}
