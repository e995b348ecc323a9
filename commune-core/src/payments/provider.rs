//! Direct provider-specific checkout integrations (wave, orange).
//!
//! Each provider needs exactly two configured credentials: its checkout
//! endpoint and an API key. Tried only when the aggregator is unavailable.

use super::webhook::first_match;
use super::{IntegrationError, SessionRequest};
use crate::config::ProviderCredentials;
use serde_json::{Value, json};
use url::Url;

/// Where provider responses put the redirect URL, in probe order.
const REDIRECT_URL_PATHS: &[&[&str]] = &[&["payment_url"], &["checkout_url"], &["url"]];

/// A resolved provider credential pair; `None` means not configured.
pub(crate) struct ProviderKeys<'a> {
    pub checkout_url: &'a Url,
    pub api_key: &'a str,
}

impl<'a> ProviderKeys<'a> {
    pub fn from_credentials(credentials: &'a ProviderCredentials) -> Option<Self> {
        Some(Self {
            checkout_url: credentials.checkout_url.as_ref()?,
            api_key: credentials.api_key.as_deref()?,
        })
    }
}

/// Create a provider checkout session and return the payer redirect URL.
pub(crate) async fn create_checkout(
    keys: &ProviderKeys<'_>,
    http: &reqwest::Client,
    request: &SessionRequest,
    currency: &str,
) -> Result<Url, IntegrationError> {
    let callback_url = request
        .base_url
        .join(&format!("/api/webhooks/{}", request.method))?;

    let body = json!({
        "amount": request.amount,
        "currency": currency,
        "reference": request.donation_id,
        "callback_url": callback_url,
        "return_url": request.return_url,
    });

    let response = http
        .post(keys.checkout_url.clone())
        .bearer_auth(keys.api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IntegrationError::Rejected(status.as_u16()));
    }

    let payload: Value = response.json().await?;
    let raw = first_match(&payload, REDIRECT_URL_PATHS)
        .and_then(Value::as_str)
        .ok_or(IntegrationError::MissingCheckoutUrl)?;
    Url::parse(raw).map_err(|_| IntegrationError::InvalidCheckoutUrl(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderCredentials;

    #[test]
    fn keys_require_both_credentials() {
        let complete = ProviderCredentials {
            checkout_url: Url::parse("https://wave.example.com/checkout").ok(),
            api_key: Some("key".into()),
        };
        assert!(ProviderKeys::from_credentials(&complete).is_some());

        let missing_key = ProviderCredentials {
            checkout_url: Url::parse("https://wave.example.com/checkout").ok(),
            api_key: None,
        };
        assert!(ProviderKeys::from_credentials(&missing_key).is_none());
        assert!(ProviderKeys::from_credentials(&ProviderCredentials::default()).is_none());
    }

    #[test]
    fn redirect_url_probe_order() {
        let payload = serde_json::json!({
            "url": "https://wave.example.com/c/low",
            "payment_url": "https://wave.example.com/c/high",
        });
        assert_eq!(
            first_match(&payload, REDIRECT_URL_PATHS).and_then(Value::as_str),
            Some("https://wave.example.com/c/high")
        );
    }
}
