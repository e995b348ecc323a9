use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use commune_core::entities::contact::ContactMessageInsert;
use commune_core::entities::notification::{NotificationKind, NotificationPriority};
use commune_core::framework::DatabaseProcessor;
use commune_core::notify::{AdminFanout, NotificationSource, spawn_admin_fanout};
use kanau::processor::Processor;
use serde::Deserialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// `POST /api/contact` — public contact form intake.
///
/// The admin fanout runs detached: the submission succeeds even if no
/// notification can be delivered.
pub async fn submit_contact_message(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.subject.trim().is_empty() || body.body.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "subject and body must not be empty".to_owned(),
        ));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let message = processor
        .process(ContactMessageInsert {
            name: body.name,
            email: body.email,
            subject: body.subject,
            body: body.body,
        })
        .await?;

    spawn_admin_fanout(
        state.db.clone(),
        AdminFanout {
            kind: NotificationKind::Contact,
            title: "Nouveau message de contact".to_owned(),
            message: format!("{} : {}", message.name, message.subject),
            priority: NotificationPriority::Normal,
            link: Some("/admin/messages".to_owned()),
            source: Some(NotificationSource {
                source_type: "contact_message".to_owned(),
                source_id: message.message_id,
            }),
        },
    );

    Ok((StatusCode::CREATED, Json(message)))
}
