//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. A `.env` file is honored in development
//! (loaded by `main` via dotenvy before this runs).

use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Bearer token required for mutating admin endpoints
    /// (order status transitions). When unset, the endpoints are open;
    /// production deployments MUST set ADMIN_TOKEN.
    pub admin_token: Option<String>,

    /// Maximum connections in the database pool
    pub db_max_connections: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./voltmart.db".to_string()),

            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
