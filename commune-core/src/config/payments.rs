use crate::entities::donation::PaymentMethod;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use url::Url;

/// Which credential set and aggregator endpoint to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Test,
    Live,
}

/// Credentials for the centralizing mobile-money aggregator.
///
/// The aggregator is attempted only when the endpoint and all four secrets
/// of the mode-selected set are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatorCredentials {
    pub endpoint: Option<Url>,
    pub master_key: Option<String>,
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub token: Option<String>,
}

impl AggregatorCredentials {
    pub fn is_complete(&self) -> bool {
        self.endpoint.is_some()
            && self.master_key.is_some()
            && self.private_key.is_some()
            && self.public_key.is_some()
            && self.token.is_some()
    }
}

/// Per-mode aggregator credential sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatorModes {
    #[serde(default)]
    pub test: AggregatorCredentials,
    #[serde(default)]
    pub live: AggregatorCredentials,
}

/// Direct integration with a single mobile-money provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub checkout_url: Option<Url>,
    pub api_key: Option<String>,
}

impl ProviderCredentials {
    pub fn is_complete(&self) -> bool {
        self.checkout_url.is_some() && self.api_key.is_some()
    }
}

/// Provider-specific integrations, keyed by payment method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub wave: ProviderCredentials,
    #[serde(default)]
    pub orange: ProviderCredentials,
}

/// Payments configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub mode: PaymentMode,
    /// ISO currency code forwarded to integrations.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Explicit base URL for self-referencing links. When set it wins over
    /// any host-derived resolution.
    pub public_base_url: Option<Url>,
    /// LAN-reachable address substituted for loopback hosts so payment-app
    /// callbacks from a phone on the same network can reach the server.
    pub lan_ip: Option<Ipv4Addr>,
    #[serde(default)]
    pub aggregator: AggregatorModes,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            mode: PaymentMode::default(),
            currency: default_currency(),
            public_base_url: None,
            lan_ip: None,
            aggregator: AggregatorModes::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

fn default_currency() -> String {
    "XOF".to_owned()
}

impl PaymentsConfig {
    /// The aggregator credential set selected by the current mode.
    pub fn aggregator_credentials(&self) -> &AggregatorCredentials {
        match self.mode {
            PaymentMode::Test => &self.aggregator.test,
            PaymentMode::Live => &self.aggregator.live,
        }
    }

    /// The direct integration for a method, if one exists at all.
    ///
    /// Only mobile-money methods have direct integrations; card, bank
    /// transfer and PayPal ride on the aggregator or the mock checkout.
    pub fn provider_credentials(&self, method: PaymentMethod) -> Option<&ProviderCredentials> {
        match method {
            PaymentMethod::Wave => Some(&self.providers.wave),
            PaymentMethod::Orange => Some(&self.providers.orange),
            PaymentMethod::Card | PaymentMethod::BankTransfer | PaymentMethod::Paypal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_credentials() -> AggregatorCredentials {
        AggregatorCredentials {
            endpoint: Url::parse("https://pay.example.com/v1/checkout-invoice/create").ok(),
            master_key: Some("mk".into()),
            private_key: Some("sk".into()),
            public_key: Some("pk".into()),
            token: Some("tok".into()),
        }
    }

    #[test]
    fn aggregator_requires_all_four_secrets_and_endpoint() {
        assert!(complete_credentials().is_complete());

        let mut missing_token = complete_credentials();
        missing_token.token = None;
        assert!(!missing_token.is_complete());

        let mut missing_endpoint = complete_credentials();
        missing_endpoint.endpoint = None;
        assert!(!missing_endpoint.is_complete());
    }

    #[test]
    fn mode_selects_the_credential_set() {
        let mut config = PaymentsConfig::default();
        config.aggregator.live = complete_credentials();

        assert!(!config.aggregator_credentials().is_complete());
        config.mode = PaymentMode::Live;
        assert!(config.aggregator_credentials().is_complete());
    }

    #[test]
    fn only_mobile_money_methods_have_direct_integrations() {
        let config = PaymentsConfig::default();
        assert!(config.provider_credentials(PaymentMethod::Wave).is_some());
        assert!(config.provider_credentials(PaymentMethod::Orange).is_some());
        assert!(config.provider_credentials(PaymentMethod::Card).is_none());
        assert!(config.provider_credentials(PaymentMethod::Paypal).is_none());
        assert!(
            config
                .provider_credentials(PaymentMethod::BankTransfer)
                .is_none()
        );
    }
}
