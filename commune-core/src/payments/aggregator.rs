//! Centralizing mobile-money aggregator integration.
//!
//! One invoice call covers every routed method (wave and orange alike); the
//! aggregator redirects the payer itself and reports the result back on the
//! IPN webhook endpoint with the donation id in `custom_data`.

use super::webhook::first_match;
use super::{IntegrationError, SessionRequest};
use crate::config::AggregatorCredentials;
use serde_json::{Value, json};
use url::Url;

/// Where aggregator responses put the payer-facing checkout URL,
/// in probe order.
const CHECKOUT_URL_PATHS: &[&[&str]] = &[&["response_text"], &["invoice", "url"], &["url"]];

/// A fully-resolved credential set. Construction doubles as the
/// "all four secrets present" availability check of the fallback chain.
pub(crate) struct AggregatorKeys<'a> {
    pub endpoint: &'a Url,
    pub master_key: &'a str,
    pub private_key: &'a str,
    pub public_key: &'a str,
    pub token: &'a str,
}

impl<'a> AggregatorKeys<'a> {
    pub fn from_credentials(credentials: &'a AggregatorCredentials) -> Option<Self> {
        Some(Self {
            endpoint: credentials.endpoint.as_ref()?,
            master_key: credentials.master_key.as_deref()?,
            private_key: credentials.private_key.as_deref()?,
            public_key: credentials.public_key.as_deref()?,
            token: credentials.token.as_deref()?,
        })
    }
}

/// Create a checkout invoice and return the aggregator-issued URL.
pub(crate) async fn create_invoice(
    keys: &AggregatorKeys<'_>,
    http: &reqwest::Client,
    request: &SessionRequest,
    currency: &str,
) -> Result<Url, IntegrationError> {
    let callback_url = request.base_url.join("/api/webhooks/aggregator")?;

    let body = json!({
        "invoice": {
            "total_amount": request.amount,
            "description": format!("Donation {}", request.donation_id),
            "currency": currency,
        },
        "actions": {
            "callback_url": callback_url,
            "return_url": request.return_url,
            "cancel_url": request.return_url,
        },
        "custom_data": {
            "donationId": request.donation_id,
        },
    });

    let response = http
        .post(keys.endpoint.clone())
        .header("MASTER-KEY", keys.master_key)
        .header("PRIVATE-KEY", keys.private_key)
        .header("PUBLIC-KEY", keys.public_key)
        .header("TOKEN", keys.token)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IntegrationError::Rejected(status.as_u16()));
    }

    let payload: Value = response.json().await?;
    let raw = first_match(&payload, CHECKOUT_URL_PATHS)
        .and_then(Value::as_str)
        .ok_or(IntegrationError::MissingCheckoutUrl)?;
    Url::parse(raw).map_err(|_| IntegrationError::InvalidCheckoutUrl(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregatorCredentials;

    #[test]
    fn keys_resolve_only_when_complete() {
        let mut credentials = AggregatorCredentials {
            endpoint: Url::parse("https://pay.example.com/create").ok(),
            master_key: Some("mk".into()),
            private_key: Some("sk".into()),
            public_key: Some("pk".into()),
            token: Some("tok".into()),
        };
        assert!(AggregatorKeys::from_credentials(&credentials).is_some());

        credentials.private_key = None;
        assert!(AggregatorKeys::from_credentials(&credentials).is_none());
    }

    #[test]
    fn checkout_url_probe_order() {
        let payload = serde_json::json!({
            "response_text": "https://pay.example.com/invoice/1",
            "url": "https://pay.example.com/other",
        });
        assert_eq!(
            first_match(&payload, CHECKOUT_URL_PATHS).and_then(Value::as_str),
            Some("https://pay.example.com/invoice/1")
        );

        let nested = serde_json::json!({"invoice": {"url": "https://pay.example.com/invoice/2"}});
        assert_eq!(
            first_match(&nested, CHECKOUT_URL_PATHS).and_then(Value::as_str),
            Some("https://pay.example.com/invoice/2")
        );
    }
}
