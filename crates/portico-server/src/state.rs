//! Shared application state.

use chrono::{DateTime, Utc};
use tracing::info;

use portico_core::PorticoConfig;
use portico_store::MemStore;

/// Shared application state accessible from all route handlers.
///
/// Built once at boot and handed to the router as `Arc<AppState>`.
pub struct AppState {
    pub config: PorticoConfig,
    pub store: MemStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: PorticoConfig) -> Self {
        let store = if config.seed_default_clusters {
            MemStore::with_default_clusters()
        } else {
            MemStore::new()
        };
        info!(
            "App state ready (seeded={}, unique cluster names={})",
            config.seed_default_clusters, config.unique_cluster_names
        );
        Self {
            config,
            store,
            started_at: Utc::now(),
        }
    }

    /// State around an existing store, e.g. one prepared by a test.
    pub fn with_store(config: PorticoConfig, store: MemStore) -> Self {
        Self {
            config,
            store,
            started_at: Utc::now(),
        }
    }
}
