use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fundraising campaign accumulating completed donations.
///
/// `collected` is maintained incrementally as donations settle and is never
/// recomputed or decremented.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct DonationCampaign {
    pub campaign_id: Uuid,
    pub title: String,
    pub goal: i64,
    pub collected: i64,
    pub status: CampaignStatus,
    pub owner_id: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "campaign_status")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Completed,
    Cancelled,
}

/// Insert a new active campaign.
#[derive(Debug, Clone)]
pub struct CampaignInsert {
    pub title: String,
    pub goal: i64,
    pub owner_id: Option<Uuid>,
}

impl Processor<CampaignInsert> for DatabaseProcessor {
    type Output = DonationCampaign;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CampaignInsert")]
    async fn process(&self, insert: CampaignInsert) -> Result<DonationCampaign, sqlx::Error> {
        sqlx::query_as::<_, DonationCampaign>(
            r#"
            INSERT INTO donation_campaigns (title, goal, owner_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(insert.title)
        .bind(insert.goal)
        .bind(insert.owner_id)
        .fetch_one(&self.pool)
        .await
    }
}

/// Look up a campaign by id.
#[derive(Debug, Clone, Copy)]
pub struct GetCampaignById {
    pub campaign_id: Uuid,
}

impl Processor<GetCampaignById> for DatabaseProcessor {
    type Output = Option<DonationCampaign>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetCampaignById")]
    async fn process(
        &self,
        query: GetCampaignById,
    ) -> Result<Option<DonationCampaign>, sqlx::Error> {
        sqlx::query_as::<_, DonationCampaign>(
            r#"SELECT * FROM donation_campaigns WHERE campaign_id = $1"#,
        )
        .bind(query.campaign_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Credit a completed donation to its campaign.
///
/// Fires once per donation transition into `completed`, on the same
/// transaction as the transition itself. An active campaign that reaches
/// its goal flips to `completed` in the same statement. Returns `false`
/// when the campaign no longer exists; the caller treats that as a
/// tolerated no-op rather than rolling back the donation.
pub(crate) async fn credit_completed_donation(
    executor: impl sqlx::PgExecutor<'_>,
    campaign_id: Uuid,
    amount: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE donation_campaigns
        SET collected = collected + $2,
            status = CASE
                WHEN status = 'active' AND collected + $2 >= goal
                    THEN 'completed'::campaign_status
                ELSE status
            END,
            updated_at = now()
        WHERE campaign_id = $1
        "#,
    )
    .bind(campaign_id)
    .bind(amount)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}
