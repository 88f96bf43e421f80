use shared_config::AppConfig;

use crate::memory::MemoryStore;

/// Process-wide collaborators, built once in `main` and handed to the
/// router as `Arc<AppState>`. Nothing reaches for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: MemoryStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: MemoryStore) -> Self {
        Self { config, store }
    }
}
