//! Security alerts (published by staff) and incidents (reported by residents).
//!
//! Every mutation of these documents is also pushed to the live event
//! streams; the broadcasting itself happens in the request handlers.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "alert_severity")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "alert_status")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "incident_status")]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Reported,
    Investigating,
    Resolved,
    Dismissed,
}

/// A security alert published by privileged staff.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct SecurityAlert {
    pub alert_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attachments: Value,
    pub created_by: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// A security incident reported by a resident, possibly anonymously.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct SecurityIncident {
    pub incident_id: Uuid,
    pub incident_type: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: IncidentStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attachments: Value,
    pub reporter_id: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

fn attachments_value(paths: Vec<String>) -> Value {
    Value::Array(paths.into_iter().map(Value::String).collect())
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AlertInsert {
    pub alert_type: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attachments: Vec<String>,
    pub created_by: Option<Uuid>,
}

impl Processor<AlertInsert> for DatabaseProcessor {
    type Output = SecurityAlert;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AlertInsert")]
    async fn process(&self, insert: AlertInsert) -> Result<SecurityAlert, sqlx::Error> {
        sqlx::query_as::<_, SecurityAlert>(
            r#"
            INSERT INTO security_alerts
                (alert_type, message, severity, latitude, longitude, attachments, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(insert.alert_type)
        .bind(insert.message)
        .bind(insert.severity)
        .bind(insert.latitude)
        .bind(insert.longitude)
        .bind(attachments_value(insert.attachments))
        .bind(insert.created_by)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetAlertById {
    pub alert_id: Uuid,
}

impl Processor<GetAlertById> for DatabaseProcessor {
    type Output = Option<SecurityAlert>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAlertById")]
    async fn process(&self, query: GetAlertById) -> Result<Option<SecurityAlert>, sqlx::Error> {
        sqlx::query_as::<_, SecurityAlert>(r#"SELECT * FROM security_alerts WHERE alert_id = $1"#)
            .bind(query.alert_id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// List alerts, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListAlerts;

impl Processor<ListAlerts> for DatabaseProcessor {
    type Output = Vec<SecurityAlert>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListAlerts")]
    async fn process(&self, _query: ListAlerts) -> Result<Vec<SecurityAlert>, sqlx::Error> {
        sqlx::query_as::<_, SecurityAlert>(
            r#"SELECT * FROM security_alerts ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Partial update of an alert; `None` fields keep their current value.
#[derive(Debug, Clone)]
pub struct AlertUpdate {
    pub alert_id: Uuid,
    pub message: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
}

impl Processor<AlertUpdate> for DatabaseProcessor {
    type Output = Option<SecurityAlert>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AlertUpdate")]
    async fn process(&self, update: AlertUpdate) -> Result<Option<SecurityAlert>, sqlx::Error> {
        sqlx::query_as::<_, SecurityAlert>(
            r#"
            UPDATE security_alerts
            SET message = COALESCE($2, message),
                severity = COALESCE($3, severity),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE alert_id = $1
            RETURNING *
            "#,
        )
        .bind(update.alert_id)
        .bind(update.message)
        .bind(update.severity)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteAlert {
    pub alert_id: Uuid,
}

impl Processor<DeleteAlert> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteAlert")]
    async fn process(&self, delete: DeleteAlert) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM security_alerts WHERE alert_id = $1"#)
            .bind(delete.alert_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IncidentInsert {
    pub incident_type: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attachments: Vec<String>,
    pub reporter_id: Option<Uuid>,
}

impl Processor<IncidentInsert> for DatabaseProcessor {
    type Output = SecurityIncident;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:IncidentInsert")]
    async fn process(&self, insert: IncidentInsert) -> Result<SecurityIncident, sqlx::Error> {
        sqlx::query_as::<_, SecurityIncident>(
            r#"
            INSERT INTO security_incidents
                (incident_type, description, severity, latitude, longitude, attachments, reporter_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(insert.incident_type)
        .bind(insert.description)
        .bind(insert.severity)
        .bind(insert.latitude)
        .bind(insert.longitude)
        .bind(attachments_value(insert.attachments))
        .bind(insert.reporter_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetIncidentById {
    pub incident_id: Uuid,
}

impl Processor<GetIncidentById> for DatabaseProcessor {
    type Output = Option<SecurityIncident>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetIncidentById")]
    async fn process(
        &self,
        query: GetIncidentById,
    ) -> Result<Option<SecurityIncident>, sqlx::Error> {
        sqlx::query_as::<_, SecurityIncident>(
            r#"SELECT * FROM security_incidents WHERE incident_id = $1"#,
        )
        .bind(query.incident_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// List incidents, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListIncidents;

impl Processor<ListIncidents> for DatabaseProcessor {
    type Output = Vec<SecurityIncident>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListIncidents")]
    async fn process(&self, _query: ListIncidents) -> Result<Vec<SecurityIncident>, sqlx::Error> {
        sqlx::query_as::<_, SecurityIncident>(
            r#"SELECT * FROM security_incidents ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Partial update of an incident; `None` fields keep their current value.
#[derive(Debug, Clone)]
pub struct IncidentUpdate {
    pub incident_id: Uuid,
    pub description: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<IncidentStatus>,
}

impl Processor<IncidentUpdate> for DatabaseProcessor {
    type Output = Option<SecurityIncident>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:IncidentUpdate")]
    async fn process(
        &self,
        update: IncidentUpdate,
    ) -> Result<Option<SecurityIncident>, sqlx::Error> {
        sqlx::query_as::<_, SecurityIncident>(
            r#"
            UPDATE security_incidents
            SET description = COALESCE($2, description),
                severity = COALESCE($3, severity),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE incident_id = $1
            RETURNING *
            "#,
        )
        .bind(update.incident_id)
        .bind(update.description)
        .bind(update.severity)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteIncident {
    pub incident_id: Uuid,
}

impl Processor<DeleteIncident> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteIncident")]
    async fn process(&self, delete: DeleteIncident) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM security_incidents WHERE incident_id = $1"#)
            .bind(delete.incident_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachments_become_a_json_array() {
        let value = attachments_value(vec!["a.jpg".into(), "b.jpg".into()]);
        assert_eq!(value, serde_json::json!(["a.jpg", "b.jpg"]));
        assert_eq!(attachments_value(vec![]), serde_json::json!([]));
    }
}
