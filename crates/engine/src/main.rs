//! Stalker TTRPG Engine - Main entry point.
//!
//! Seeds empty reference tables from CSV, then checks the reference
//! repository can serve them.

use std::sync::Arc;

use stalker_engine::infrastructure::{
    config::DatabaseConfig, database::ConnectionManager, reference::SqlReferenceRepo,
};
use stalker_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (Taskfile runs the engine from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stalker_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stalker TTRPG Engine");

    let config = DatabaseConfig::from_env();
    tracing::info!(
        database = %config.redacted_target(),
        csv_directory = %config.csv_directory.display(),
        "Loaded configuration"
    );

    let reference = Arc::new(SqlReferenceRepo::new(ConnectionManager::new(config.clone())));
    let app = App::new(config, reference.clone());

    let report = app.seed_reference_data().await;
    match serde_json::to_string(&report) {
        Ok(json) => tracing::info!(report = %json, "Seed run finished"),
        Err(e) => tracing::warn!(error = %e, "Could not serialize seed report"),
    }
    if let Some(reason) = &report.aborted {
        tracing::warn!(reason = %reason, "Continuing without a complete seed run");
    }

    reference.connect().await?;
    let tables = app.use_cases.browse.tables().await?;
    tracing::info!(count = tables.len(), "Reference tables available");
    reference.close().await;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
