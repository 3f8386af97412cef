//! Application state and composition.

use std::sync::Arc;

use stalker_domain::{SeedLayout, SeedReport};

use crate::infrastructure::{
    config::DatabaseConfig, database::ConnectionManager, ports::ReferenceRepo,
};
use crate::use_cases::{BrowseReference, SeedOrchestrator};

/// Main application state.
///
/// Holds the reference repository and the use cases built on it.
pub struct App {
    pub config: DatabaseConfig,
    pub reference: Arc<dyn ReferenceRepo>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub browse: BrowseReference,
}

impl App {
    pub fn new(config: DatabaseConfig, reference: Arc<dyn ReferenceRepo>) -> Self {
        let browse = BrowseReference::new(reference.clone());
        Self {
            config,
            reference,
            use_cases: UseCases { browse },
        }
    }

    /// Load every empty reference table from the configured CSV directory.
    ///
    /// Uses a connection of its own, closed again before returning.
    pub async fn seed_reference_data(&self) -> SeedReport {
        seed_reference_data(&self.config).await
    }
}

pub async fn seed_reference_data(config: &DatabaseConfig) -> SeedReport {
    let mut manager = ConnectionManager::new(config.clone());
    let layout = SeedLayout::new(config.csv_directory.clone());
    SeedOrchestrator::new(&mut manager, layout)
        .with_batch_size(config.batch_size)
        .ensure_seeded()
        .await
}
