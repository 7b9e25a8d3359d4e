pub mod config;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod routes;
pub mod services;

use std::sync::Arc;

use services::catalog::Catalog;
use services::classification::Classifier;
use services::field_inventory::InventoryOptions;
use services::session::SessionStore;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    /// Build state from configuration and an already-loaded catalog.
    pub fn new(config: config::AppConfig, catalog: Catalog) -> Self {
        let sessions = SessionStore::new(config.max_sessions);
        let classifier = services::classification::from_config(&config);
        Self {
            config,
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
            classifier,
        }
    }

    /// Options for the field inventory generator derived from configuration.
    pub fn inventory_options(&self) -> InventoryOptions {
        InventoryOptions {
            cookie_mode: self.config.cookie_mode,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}
