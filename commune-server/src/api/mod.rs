//! Request handlers for the public API.
//!
//! Authentication/authorization middleware is wired in front of these
//! routes at deployment; handlers only implement the payment, notification
//! and live-event semantics.

pub mod checkout;
pub mod contact;
pub mod donations;
pub mod live;
pub mod notifications;
pub mod security;
pub mod webhooks;

use crate::state::AppState;
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Donations & campaigns
        .route("/donations", post(donations::create_donation))
        .route("/donations/{donation_id}", get(donations::get_donation))
        .route("/campaigns", post(donations::create_campaign))
        .route("/campaigns/{campaign_id}", get(donations::get_campaign))
        // Payment webhooks
        .route("/webhooks/aggregator", post(webhooks::aggregator_webhook))
        .route("/webhooks/{provider}", post(webhooks::provider_webhook))
        // Mock checkout
        .route("/checkout/mock", get(checkout::mock_checkout_page))
        // Contact form
        .route("/contact", post(contact::submit_contact_message))
        // Security alerts & incidents
        .route(
            "/security/alerts",
            get(security::list_alerts).post(security::create_alert),
        )
        .route(
            "/security/alerts/{alert_id}",
            get(security::get_alert)
                .put(security::update_alert)
                .delete(security::delete_alert),
        )
        .route(
            "/security/incidents",
            get(security::list_incidents).post(security::create_incident),
        )
        .route(
            "/security/incidents/{incident_id}",
            get(security::get_incident)
                .put(security::update_incident)
                .delete(security::delete_incident),
        )
        // Notifications
        .route(
            "/users/{user_id}/notifications",
            get(notifications::list_for_user),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(notifications::mark_read),
        )
        .route(
            "/notifications/{notification_id}",
            delete(notifications::delete_notification),
        )
        // Live event streams
        .route("/live/alerts", get(live::alerts_stream))
        .route("/live/incidents", get(live::incidents_stream))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// The requested document was not found.
    NotFound(&'static str),
    /// Malformed or out-of-range request input.
    InvalidArgument(String),
    /// A server-side failure unrelated to the caller's input.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
            ApiError::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(message, "API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}
