//! TOML file configuration structure.
//!
//! Maps directly to the `commune-config.toml` file format; the section
//! types themselves live in `commune-core::config` so they can be shared.

use commune_core::config::{PaymentsConfig, ServerConfig};
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use commune_core::config::PaymentMode;
    use commune_core::entities::donation::PaymentMethod;

    #[test]
    fn full_config_parses() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[payments]
mode = "live"
currency = "XOF"
public_base_url = "https://commune.example.org"
lan_ip = "192.168.1.42"

[payments.aggregator.live]
endpoint = "https://pay.example.com/v1/checkout-invoice/create"
master_key = "mk"
private_key = "sk"
public_key = "pk"
token = "tok"

[payments.providers.wave]
checkout_url = "https://wave.example.com/checkout"
api_key = "wave-key"
"#;
        let config: FileConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.payments.mode, PaymentMode::Live);
        assert!(config.payments.aggregator_credentials().is_complete());
        assert!(!config.payments.aggregator.test.is_complete());
        assert!(
            config
                .payments
                .provider_credentials(PaymentMethod::Wave)
                .is_some_and(|p| p.is_complete())
        );
        assert_eq!(
            config.payments.lan_ip,
            "192.168.1.42".parse().ok()
        );
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: FileConfig = toml::from_str("").expect("parse");
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.payments.mode, PaymentMode::Test);
        assert_eq!(config.payments.currency, "XOF");
        assert!(config.payments.public_base_url.is_none());
        assert!(!config.payments.aggregator_credentials().is_complete());
    }
}
