//! Fire-and-forget notification fanout to all administrators.
//!
//! Fanout runs in a detached task with its own error boundary: the request
//! that triggered it (a contact-form submission, an incident report) must
//! succeed even if no admin can be notified at all.

use crate::entities::notification::{NotificationInsert, NotificationKind, NotificationPriority};
use crate::entities::user::GetAdminUserIds;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use sqlx::PgPool;
use uuid::Uuid;

/// Reference back to the document that caused the notification.
#[derive(Debug, Clone)]
pub struct NotificationSource {
    pub source_type: String,
    pub source_id: Uuid,
}

/// One fanout request: the same title/message/priority delivered to every
/// administrator as an independent notification row.
#[derive(Debug, Clone)]
pub struct AdminFanout {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub link: Option<String>,
    pub source: Option<NotificationSource>,
}

impl AdminFanout {
    /// Expand into one insert per recipient.
    fn rows(&self, recipients: &[Uuid]) -> Vec<NotificationInsert> {
        recipients
            .iter()
            .map(|recipient_id| NotificationInsert {
                recipient_id: *recipient_id,
                kind: self.kind,
                title: self.title.clone(),
                message: self.message.clone(),
                priority: self.priority,
                link: self.link.clone(),
                source_type: self.source.as_ref().map(|s| s.source_type.clone()),
                source_id: self.source.as_ref().map(|s| s.source_id),
            })
            .collect()
    }
}

/// Dispatch a fanout on a detached task. Errors are logged, never returned.
pub fn spawn_admin_fanout(pool: PgPool, fanout: AdminFanout) {
    tokio::spawn(async move {
        if let Err(e) = fan_out(pool, &fanout).await {
            tracing::error!(
                error = %e,
                title = %fanout.title,
                "admin notification fanout failed"
            );
        }
    });
}

async fn fan_out(pool: PgPool, fanout: &AdminFanout) -> Result<(), sqlx::Error> {
    let processor = DatabaseProcessor { pool };

    // Resolved at fanout time, never cached: role changes apply to the
    // very next fanout.
    let admins = processor.process(GetAdminUserIds).await?;
    if admins.is_empty() {
        tracing::debug!(title = %fanout.title, "no administrators to notify");
        return Ok(());
    }

    // Row-by-row inserts so one undeliverable recipient cannot block the
    // rest of the fanout.
    let total = admins.len();
    let mut delivered = 0usize;
    for insert in fanout.rows(&admins) {
        let recipient_id = insert.recipient_id;
        match processor.process(insert).await {
            Ok(_) => delivered += 1,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    recipient_id = %recipient_id,
                    "skipping undeliverable admin notification"
                );
            }
        }
    }

    tracing::debug!(delivered, total, title = %fanout.title, "admin fanout finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanout_expands_to_one_row_per_admin() {
        let admins: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let fanout = AdminFanout {
            kind: NotificationKind::Security,
            title: "New security incident".into(),
            message: "A resident reported a break-in".into(),
            priority: NotificationPriority::High,
            link: Some("/admin/security/incidents".into()),
            source: Some(NotificationSource {
                source_type: "security_incident".into(),
                source_id: Uuid::new_v4(),
            }),
        };

        let rows = fanout.rows(&admins);
        assert_eq!(rows.len(), admins.len());

        let mut recipients: Vec<Uuid> = rows.iter().map(|r| r.recipient_id).collect();
        recipients.sort();
        recipients.dedup();
        assert_eq!(recipients.len(), admins.len(), "recipients must be distinct");

        for row in &rows {
            assert_eq!(row.title, fanout.title);
            assert_eq!(row.message, fanout.message);
            assert_eq!(row.priority, NotificationPriority::High);
            assert_eq!(row.link.as_deref(), Some("/admin/security/incidents"));
        }
    }

    #[test]
    fn empty_admin_set_expands_to_nothing() {
        let fanout = AdminFanout {
            kind: NotificationKind::Contact,
            title: "New contact message".into(),
            message: "Subject: potholes".into(),
            priority: NotificationPriority::Normal,
            link: None,
            source: None,
        };
        assert!(fanout.rows(&[]).is_empty());
    }
}
