//! Client configuration.
//!
//! All settings have defaults pointing at a local development server, so
//! the client starts with zero configuration.

use std::path::PathBuf;

use parley_shared::constants::{DEFAULT_API_BASE, DEFAULT_WS_URL};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the HTTP API server.
    /// Env: `PARLEY_API_BASE`
    /// Default: `http://localhost:8080`
    pub api_base: String,

    /// WebSocket endpoint for the realtime connection.
    /// Env: `PARLEY_WS_URL`
    /// Default: `ws://localhost:8080/ws`
    pub ws_url: String,

    /// Explicit path for the local database. `None` uses the platform
    /// data directory.
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            db_path: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from environment variables, falling back to
    /// the defaults above.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("PARLEY_API_BASE").unwrap_or(defaults.api_base),
            ws_url: std::env::var("PARLEY_WS_URL").unwrap_or(defaults.ws_url),
            db_path: std::env::var("PARLEY_DB_PATH").ok().map(PathBuf::from),
        }
    }
}
