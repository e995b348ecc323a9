use sqlx::PgPool;

/// Host for database-backed [`kanau::processor::Processor`] messages.
///
/// Every persistent operation in this crate is a message struct processed
/// against this type, so handlers stay declarative and each query carries
/// its own tracing span.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
