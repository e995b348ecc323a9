//! Account lookups needed by the notification fanout.
//!
//! Account management and authentication live elsewhere; this module only
//! resolves the current administrator set, queried fresh on every fanout so
//! membership changes are picked up immediately.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// Resolve the ids of all accounts with the `admin` role.
#[derive(Debug, Clone, Copy)]
pub struct GetAdminUserIds;

impl Processor<GetAdminUserIds> for DatabaseProcessor {
    type Output = Vec<Uuid>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAdminUserIds")]
    async fn process(&self, _query: GetAdminUserIds) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(r#"SELECT user_id FROM users WHERE role = 'admin'"#)
            .fetch_all(&self.pool)
            .await
    }
}
