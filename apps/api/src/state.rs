//! Shared application state handed to every handler.

use std::sync::Arc;

use voltmart_db::Database;

use crate::config::ApiConfig;

/// Shared state: the database handle (pool inside, cheap to clone) and
/// the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
