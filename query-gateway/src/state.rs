//! Application state for the query gateway.

use std::sync::Arc;

use common::config::SourceRegistry;

use crate::db::ConnectionProvider;

/// Application state shared across handlers.
///
/// Both fields are read-only after startup, so cloning the state per
/// request is cheap and needs no synchronization.
#[derive(Clone)]
pub struct AppState {
    /// Immutable source-index-to-database table.
    pub registry: Arc<SourceRegistry>,
    /// Connection provider used to dial the database per request.
    pub provider: Arc<dyn ConnectionProvider>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(registry: SourceRegistry, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            registry: Arc::new(registry),
            provider,
        }
    }
}
