use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use commune_core::entities::campaign::{CampaignInsert, GetCampaignById};
use commune_core::entities::donation::{
    DonationInsert, GetDonationById, PaymentMethod, UnknownPaymentMethod,
};
use commune_core::framework::DatabaseProcessor;
use commune_core::payments::{self, SessionError, SessionRequest, base_url};
use kanau::processor::Processor;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    pub campaign_id: Uuid,
    pub donor_id: Option<Uuid>,
    pub amount: i64,
    pub payment_method: String,
    #[serde(default)]
    pub anonymous: bool,
    pub message: Option<String>,
    pub return_url: Option<Url>,
}

/// `POST /api/donations` — create a pending donation and open a payment
/// session for it.
///
/// Inputs are validated before the donation row is created, so an invalid
/// amount or method never leaves a dangling record. The response carries
/// the payer redirect URL, which is always produced: a missing or failing
/// integration degrades to the mock checkout instead of failing.
pub async fn create_donation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateDonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let method: PaymentMethod = body
        .payment_method
        .parse()
        .map_err(|e: UnknownPaymentMethod| ApiError::InvalidArgument(e.to_string()))?;

    if body.amount < 1 {
        return Err(ApiError::InvalidArgument(format!(
            "donation amount must be at least 1 (got {})",
            body.amount
        )));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetCampaignById {
            campaign_id: body.campaign_id,
        })
        .await?
        .ok_or(ApiError::NotFound("campaign not found"))?;

    let donation = processor
        .process(DonationInsert {
            campaign_id: body.campaign_id,
            donor_id: body.donor_id,
            amount: body.amount,
            payment_method: method,
            anonymous: body.anonymous,
            message: body.message,
        })
        .await?;

    let payments_config = state.config.payments.read().await.clone();
    let listen_port = state.config.server.read().await.listen.port();
    let request_host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    let base = base_url::resolve_base_url(&payments_config, request_host, listen_port)
        .map_err(|e| ApiError::Internal(format!("failed to resolve base url: {e}")))?;

    let session = payments::initiate_session(
        &payments_config,
        &state.http,
        SessionRequest {
            donation_id: donation.donation_id,
            method,
            amount: donation.amount,
            return_url: body.return_url,
            base_url: base,
        },
    )
    .await
    .map_err(|e| match e {
        SessionError::InvalidAmount(_) => ApiError::InvalidArgument(e.to_string()),
        SessionError::Url(_) => ApiError::Internal(e.to_string()),
    })?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/donations/{donation_id}`
pub async fn get_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let donation = processor
        .process(GetDonationById { donation_id })
        .await?
        .ok_or(ApiError::NotFound("donation not found"))?;
    Ok(Json(donation))
}

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub goal: i64,
    pub owner_id: Option<Uuid>,
}

/// `POST /api/campaigns`
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.goal < 1 {
        return Err(ApiError::InvalidArgument(format!(
            "campaign goal must be at least 1 (got {})",
            body.goal
        )));
    }
    if body.title.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "campaign title must not be empty".to_owned(),
        ));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let campaign = processor
        .process(CampaignInsert {
            title: body.title,
            goal: body.goal,
            owner_id: body.owner_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// `GET /api/campaigns/{campaign_id}`
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let campaign = processor
        .process(GetCampaignById { campaign_id })
        .await?
        .ok_or(ApiError::NotFound("campaign not found"))?;
    Ok(Json(campaign))
}
