//! Configuration loading for commune-server.
//!
//! Reads the TOML file, applies CLI overrides, and wraps the sections in
//! the shared per-section locks used across the application.

pub mod file;

use crate::config::file::FileConfig;
use commune_core::config::{PaymentsConfig, ServerConfig, SharedConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all sections.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub payments: PaymentsConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with per-section locks.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            server: Arc::new(RwLock::new(self.server)),
            payments: Arc::new(RwLock::new(self.payments)),
        }
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load the configuration file and apply CLI overrides.
    ///
    /// A missing file is not an error: the server then runs with defaults,
    /// which means no payment integration and the mock checkout only.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "config file not found, using defaults (mock checkout only)"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut server = file_config.server;
        if let Some(listen) = self.listen_override {
            server.listen = listen;
        }

        Ok(LoadedConfig {
            server,
            payments: file_config.payments,
        })
    }

    /// Re-read the configuration (SIGHUP handler).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
