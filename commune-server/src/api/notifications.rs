use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use commune_core::entities::notification::{
    DeleteNotification, ListNotificationsForRecipient, MarkNotificationRead,
};
use commune_core::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

/// `GET /api/users/{user_id}/notifications`
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let notifications = processor
        .process(ListNotificationsForRecipient {
            recipient_id: user_id,
        })
        .await?;
    Ok(Json(notifications))
}

/// `POST /api/notifications/{notification_id}/read`
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let notification = processor
        .process(MarkNotificationRead { notification_id })
        .await?
        .ok_or(ApiError::NotFound("notification not found"))?;
    Ok(Json(notification))
}

/// `DELETE /api/notifications/{notification_id}`
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    if processor.process(DeleteNotification { notification_id }).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("notification not found"))
    }
}
