//! Payment session initiation and webhook interpretation.
//!
//! Session initiation is an ordered fallback chain: the centralizing
//! aggregator when its credentials are complete, then the method's direct
//! integration, then the local mock checkout. Integration failures are
//! absorbed by the chain and logged, never surfaced to the donor.

pub mod aggregator;
pub mod base_url;
pub mod mock;
pub mod provider;
pub mod webhook;

use crate::config::PaymentsConfig;
use crate::entities::donation::PaymentMethod;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// Inputs for one payment session. The pending donation row already exists;
/// this module mutates no persistent state.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub donation_id: Uuid,
    pub method: PaymentMethod,
    pub amount: i64,
    pub return_url: Option<Url>,
    pub base_url: Url,
}

/// The payer-facing result of session initiation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub payment_url: Url,
    pub donation_id: Uuid,
}

/// Invalid session inputs, rejected before any network call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("donation amount must be at least 1 (got {0})")]
    InvalidAmount(i64),
    #[error("failed to build checkout url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure of one outbound integration call. Absorbed by the fallback
/// chain; callers of [`initiate_session`] never see it.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("integration answered with status {0}")]
    Rejected(u16),
    #[error("response carries no checkout url")]
    MissingCheckoutUrl,
    #[error("response checkout url is not a valid url: {0}")]
    InvalidCheckoutUrl(String),
    #[error("failed to build callback url: {0}")]
    CallbackUrl(#[from] url::ParseError),
}

/// Obtain a payer-facing redirect URL for the requested amount and method.
#[tracing::instrument(
    skip(config, http, request),
    fields(donation_id = %request.donation_id, method = %request.method)
)]
pub async fn initiate_session(
    config: &PaymentsConfig,
    http: &reqwest::Client,
    request: SessionRequest,
) -> Result<PaymentSession, SessionError> {
    if request.amount < 1 {
        return Err(SessionError::InvalidAmount(request.amount));
    }

    if let Some(keys) = aggregator::AggregatorKeys::from_credentials(config.aggregator_credentials())
    {
        match aggregator::create_invoice(&keys, http, &request, &config.currency).await {
            Ok(payment_url) => {
                tracing::debug!(url = %payment_url, "aggregator session created");
                return Ok(PaymentSession {
                    payment_url,
                    donation_id: request.donation_id,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "aggregator unavailable, trying direct integration");
            }
        }
    }

    if let Some(keys) = config
        .provider_credentials(request.method)
        .and_then(provider::ProviderKeys::from_credentials)
    {
        match provider::create_checkout(&keys, http, &request, &config.currency).await {
            Ok(payment_url) => {
                tracing::debug!(url = %payment_url, "direct provider session created");
                return Ok(PaymentSession {
                    payment_url,
                    donation_id: request.donation_id,
                });
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = %request.method,
                    "direct integration unavailable, falling back to mock checkout"
                );
            }
        }
    }

    let payment_url = mock::checkout_url(&request)?;
    Ok(PaymentSession {
        payment_url,
        donation_id: request.donation_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: i64) -> SessionRequest {
        SessionRequest {
            donation_id: Uuid::new_v4(),
            method: PaymentMethod::Wave,
            amount,
            return_url: Url::parse("https://commune.example.org/merci").ok(),
            base_url: Url::parse("http://10.0.0.5:8080").expect("static url"),
        }
    }

    #[tokio::test]
    async fn invalid_amount_fails_before_anything_else() {
        let config = PaymentsConfig::default();
        let http = reqwest::Client::new();
        for amount in [0, -1, -5000] {
            let err = initiate_session(&config, &http, request(amount))
                .await
                .unwrap_err();
            assert!(matches!(err, SessionError::InvalidAmount(a) if a == amount));
        }
    }

    #[tokio::test]
    async fn no_credentials_means_mock_checkout() {
        let config = PaymentsConfig::default();
        let http = reqwest::Client::new();
        let req = request(5000);
        let donation_id = req.donation_id;

        let session = initiate_session(&config, &http, req).await.expect("session");
        assert_eq!(session.donation_id, donation_id);

        let url = session.payment_url.as_str();
        assert!(url.starts_with("http://10.0.0.5:8080/api/checkout/mock?"));
        assert!(url.contains(&donation_id.to_string()));
        assert!(url.contains("method=wave"));
        assert!(url.contains("amount=5000"));
    }
}
