//! Security alert and incident handlers.
//!
//! Every mutation publishes exactly one event to the corresponding live
//! channel. Incident creation additionally fans out a high-priority
//! notification to all administrators.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use commune_core::entities::notification::{NotificationKind, NotificationPriority};
use commune_core::entities::security::{
    AlertInsert, AlertSeverity, AlertStatus, AlertUpdate, DeleteAlert, DeleteIncident,
    GetAlertById, GetIncidentById, IncidentInsert, IncidentStatus, IncidentUpdate, ListAlerts,
    ListIncidents,
};
use commune_core::events::{LiveChannel, LiveEvent, MutationKind};
use commune_core::framework::DatabaseProcessor;
use commune_core::notify::{AdminFanout, NotificationSource, spawn_admin_fanout};
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

fn default_severity() -> AlertSeverity {
    AlertSeverity::Medium
}

/// Publish a mutated document to its live channel.
fn publish(state: &AppState, channel: LiveChannel, kind: MutationKind, document: &impl Serialize) {
    match serde_json::to_value(document) {
        Ok(payload) => {
            state.live.publish(LiveEvent::new(channel, kind, payload));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize live event payload");
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    pub alert_type: String,
    pub message: String,
    #[serde(default = "default_severity")]
    pub severity: AlertSeverity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_by: Option<Uuid>,
}

/// `POST /api/security/alerts`
pub async fn create_alert(
    State(state): State<AppState>,
    Json(body): Json<CreateAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let alert = processor
        .process(AlertInsert {
            alert_type: body.alert_type,
            message: body.message,
            severity: body.severity,
            latitude: body.latitude,
            longitude: body.longitude,
            attachments: body.attachments,
            created_by: body.created_by,
        })
        .await?;

    publish(&state, LiveChannel::Alerts, MutationKind::Create, &alert);
    Ok((StatusCode::CREATED, Json(alert)))
}

/// `GET /api/security/alerts`
pub async fn list_alerts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    Ok(Json(processor.process(ListAlerts).await?))
}

/// `GET /api/security/alerts/{alert_id}`
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let alert = processor
        .process(GetAlertById { alert_id })
        .await?
        .ok_or(ApiError::NotFound("alert not found"))?;
    Ok(Json(alert))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAlertRequest {
    pub message: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
}

/// `PUT /api/security/alerts/{alert_id}`
pub async fn update_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
    Json(body): Json<UpdateAlertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let alert = processor
        .process(AlertUpdate {
            alert_id,
            message: body.message,
            severity: body.severity,
            status: body.status,
        })
        .await?
        .ok_or(ApiError::NotFound("alert not found"))?;

    publish(&state, LiveChannel::Alerts, MutationKind::Update, &alert);
    Ok(Json(alert))
}

/// `DELETE /api/security/alerts/{alert_id}`
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    if !processor.process(DeleteAlert { alert_id }).await? {
        return Err(ApiError::NotFound("alert not found"));
    }

    state
        .live
        .publish(LiveEvent::deleted(LiveChannel::Alerts, alert_id));
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateIncidentRequest {
    pub incident_type: String,
    pub description: String,
    #[serde(default = "default_severity")]
    pub severity: AlertSeverity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Absent for anonymous reports.
    pub reporter_id: Option<Uuid>,
}

/// `POST /api/security/incidents`
pub async fn create_incident(
    State(state): State<AppState>,
    Json(body): Json<CreateIncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let incident = processor
        .process(IncidentInsert {
            incident_type: body.incident_type,
            description: body.description,
            severity: body.severity,
            latitude: body.latitude,
            longitude: body.longitude,
            attachments: body.attachments,
            reporter_id: body.reporter_id,
        })
        .await?;

    publish(
        &state,
        LiveChannel::Incidents,
        MutationKind::Create,
        &incident,
    );

    spawn_admin_fanout(
        state.db.clone(),
        AdminFanout {
            kind: NotificationKind::Security,
            title: "Nouvel incident de sécurité".to_owned(),
            message: format!("{} : {}", incident.incident_type, incident.description),
            priority: NotificationPriority::High,
            link: Some(format!(
                "/admin/security/incidents/{}",
                incident.incident_id
            )),
            source: Some(NotificationSource {
                source_type: "security_incident".to_owned(),
                source_id: incident.incident_id,
            }),
        },
    );

    Ok((StatusCode::CREATED, Json(incident)))
}

/// `GET /api/security/incidents`
pub async fn list_incidents(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    Ok(Json(processor.process(ListIncidents).await?))
}

/// `GET /api/security/incidents/{incident_id}`
pub async fn get_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let incident = processor
        .process(GetIncidentById { incident_id })
        .await?
        .ok_or(ApiError::NotFound("incident not found"))?;
    Ok(Json(incident))
}

#[derive(Debug, Deserialize)]
pub struct UpdateIncidentRequest {
    pub description: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<IncidentStatus>,
}

/// `PUT /api/security/incidents/{incident_id}`
pub async fn update_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Json(body): Json<UpdateIncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let incident = processor
        .process(IncidentUpdate {
            incident_id,
            description: body.description,
            severity: body.severity,
            status: body.status,
        })
        .await?
        .ok_or(ApiError::NotFound("incident not found"))?;

    publish(
        &state,
        LiveChannel::Incidents,
        MutationKind::Update,
        &incident,
    );
    Ok(Json(incident))
}

/// `DELETE /api/security/incidents/{incident_id}`
pub async fn delete_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    if !processor.process(DeleteIncident { incident_id }).await? {
        return Err(ApiError::NotFound("incident not found"));
    }

    state
        .live
        .publish(LiveEvent::deleted(LiveChannel::Incidents, incident_id));
    Ok(StatusCode::NO_CONTENT)
}
