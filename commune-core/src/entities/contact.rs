use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::Serialize;
use uuid::Uuid;

/// A message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ContactMessage {
    pub message_id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ContactMessageInsert {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

impl Processor<ContactMessageInsert> for DatabaseProcessor {
    type Output = ContactMessage;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ContactMessageInsert")]
    async fn process(&self, insert: ContactMessageInsert) -> Result<ContactMessage, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(insert.name)
        .bind(insert.email)
        .bind(insert.subject)
        .bind(insert.body)
        .fetch_one(&self.pool)
        .await
    }
}
