use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a notification stays visible before the expiry sweep removes it.
pub const NOTIFICATION_TTL_DAYS: i64 = 30;

/// A notification addressed to a single recipient.
///
/// Fanout creates one independent row per recipient, never a shared row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub link: Option<String>,
    pub source_type: Option<String>,
    pub source_id: Option<Uuid>,
    pub read: bool,
    pub read_at: Option<time::PrimitiveDateTime>,
    pub created_at: time::PrimitiveDateTime,
    pub expires_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case", type_name = "notification_kind")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SystemNotification,
    Donation,
    Security,
    Contact,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "notification_priority")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

/// Insert a single notification row.
#[derive(Debug, Clone)]
pub struct NotificationInsert {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub link: Option<String>,
    pub source_type: Option<String>,
    pub source_id: Option<Uuid>,
}

impl Processor<NotificationInsert> for DatabaseProcessor {
    type Output = Notification;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:NotificationInsert")]
    async fn process(&self, insert: NotificationInsert) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications
                (recipient_id, kind, title, message, priority, link, source_type, source_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(insert.recipient_id)
        .bind(insert.kind)
        .bind(insert.title)
        .bind(insert.message)
        .bind(insert.priority)
        .bind(insert.link)
        .bind(insert.source_type)
        .bind(insert.source_id)
        .fetch_one(&self.pool)
        .await
    }
}

/// List the unexpired notifications of one recipient, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListNotificationsForRecipient {
    pub recipient_id: Uuid,
}

impl Processor<ListNotificationsForRecipient> for DatabaseProcessor {
    type Output = Vec<Notification>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListNotificationsForRecipient")]
    async fn process(
        &self,
        query: ListNotificationsForRecipient,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1 AND expires_at > now()
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.recipient_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Flip a notification's read flag.
#[derive(Debug, Clone, Copy)]
pub struct MarkNotificationRead {
    pub notification_id: Uuid,
}

impl Processor<MarkNotificationRead> for DatabaseProcessor {
    type Output = Option<Notification>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkNotificationRead")]
    async fn process(
        &self,
        update: MarkNotificationRead,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = true, read_at = now()
            WHERE notification_id = $1
            RETURNING *
            "#,
        )
        .bind(update.notification_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Delete a notification (owner action).
#[derive(Debug, Clone, Copy)]
pub struct DeleteNotification {
    pub notification_id: Uuid,
}

impl Processor<DeleteNotification> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteNotification")]
    async fn process(&self, delete: DeleteNotification) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM notifications WHERE notification_id = $1"#)
            .bind(delete.notification_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Remove notifications past their expiry. Run periodically by the server.
#[derive(Debug, Clone, Copy)]
pub struct PurgeExpiredNotifications;

impl Processor<PurgeExpiredNotifications> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:PurgeExpiredNotifications")]
    async fn process(&self, _purge: PurgeExpiredNotifications) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM notifications WHERE expires_at <= now()"#)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
