use axum::{
    Json,
    extract::{Path, State},
};
use commune_core::entities::donation::{
    Donation, DonationStatus, GetDonationById, PaymentMethod, SettleDonation,
    UnknownPaymentMethod,
};
use commune_core::framework::DatabaseProcessor;
use commune_core::payments::webhook::{self, WebhookSource};
use kanau::processor::Processor;
use serde_json::Value;

use super::ApiError;
use crate::state::AppState;

/// `POST /api/webhooks/aggregator` — the aggregator's IPN callback.
pub async fn aggregator_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Donation>, ApiError> {
    apply(state, WebhookSource::Aggregator, payload).await
}

/// `POST /api/webhooks/{provider}` — provider-specific callbacks, also the
/// target of the mock checkout's simulate buttons.
pub async fn provider_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Donation>, ApiError> {
    let method: PaymentMethod = provider
        .parse()
        .map_err(|e: UnknownPaymentMethod| ApiError::InvalidArgument(e.to_string()))?;
    apply(state, WebhookSource::Provider(method), payload).await
}

/// Apply a provider's verdict to the referenced donation.
///
/// The settle step only fires for donations still `pending`: a re-delivered
/// webhook finds no pending row, is acknowledged with the current document
/// and re-applies no effect. The status transition and the campaign credit
/// commit on one transaction, so a mid-flight failure leaves the donation
/// `pending` for the retried delivery and the campaign aggregate is
/// credited exactly once per completed donation.
async fn apply(
    state: AppState,
    source: WebhookSource,
    payload: Value,
) -> Result<Json<Donation>, ApiError> {
    let outcome =
        webhook::interpret(&payload).map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

    let status = if outcome.success {
        DonationStatus::Completed
    } else {
        DonationStatus::Failed
    };
    let transaction_id = webhook::transaction_id(source, outcome.success);

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let settled = processor
        .process(SettleDonation {
            donation_id: outcome.donation_id,
            status,
            transaction_id,
        })
        .await?;

    match settled {
        Some(settled) => {
            let donation = settled.donation;
            tracing::info!(
                donation_id = %donation.donation_id,
                status = ?donation.status,
                source = %source,
                "donation settled"
            );

            if outcome.success && !settled.campaign_credited {
                // Tolerated inconsistency: the donation stands even if
                // its campaign has been deleted meanwhile.
                tracing::warn!(
                    campaign_id = %donation.campaign_id,
                    donation_id = %donation.donation_id,
                    "campaign missing, completed donation not credited"
                );
            }

            Ok(Json(donation))
        }
        None => {
            let existing = processor
                .process(GetDonationById {
                    donation_id: outcome.donation_id,
                })
                .await?
                .ok_or(ApiError::NotFound("donation not found"))?;

            tracing::debug!(
                donation_id = %existing.donation_id,
                status = ?existing.status,
                source = %source,
                "webhook re-delivery for settled donation ignored"
            );
            Ok(Json(existing))
        }
    }
}
