//! Application state shared across all request handlers.

use commune_core::config::SharedConfig;
use commune_core::events::LiveBroadcaster;
use sqlx::PgPool;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around (config sections are behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Runtime configuration (reloadable via SIGHUP).
    pub config: SharedConfig,
    /// Live subscriber registry for the alert/incident streams.
    pub live: LiveBroadcaster,
    /// Outbound HTTP client for payment integrations.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: PgPool, config: SharedConfig) -> Self {
        Self {
            db,
            config,
            live: LiveBroadcaster::new(),
            http: reqwest::Client::new(),
        }
    }
}
