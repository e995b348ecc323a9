//! Background maintenance tasks.

use commune_core::entities::notification::PurgeExpiredNotifications;
use commune_core::framework::DatabaseProcessor;
use kanau::processor::Processor;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// How often expired notifications are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawns the hourly notification expiry sweep.
///
/// Stands in for a store-level TTL index: rows past `expires_at` are
/// removed in bulk. Returns a Notify used to stop the task during shutdown.
pub fn spawn_notification_purger(pool: PgPool) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let processor = DatabaseProcessor { pool };

        loop {
            tokio::select! {
                biased;

                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Notification purger shutting down");
                    break;
                }

                _ = tokio::time::sleep(PURGE_INTERVAL) => {
                    match processor.process(PurgeExpiredNotifications).await {
                        Ok(0) => {}
                        Ok(purged) => {
                            tracing::info!(purged, "Removed expired notifications");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Notification purge failed");
                        }
                    }
                }
            }
        }
    });

    shutdown_notify
}
