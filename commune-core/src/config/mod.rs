//! Runtime configuration types shared between crates.
//!
//! Loading and parsing of the TOML file is handled by the server crate;
//! these types are the validated runtime view.

mod payments;
mod server;

pub use payments::{
    AggregatorCredentials, AggregatorModes, PaymentMode, PaymentsConfig, ProviderCredentials,
    ProvidersConfig,
};
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// Sections are locked independently so a payment-session request never
/// contends with, say, a listen-address read.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Payment integrations, mode and base-URL overrides.
    pub payments: Arc<RwLock<PaymentsConfig>>,
}
