use crate::entities::campaign;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single donation towards a campaign.
///
/// Created in `Pending` when a payment session is initiated and moved to a
/// terminal status exactly once, by a provider webhook or the mock checkout.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Donation {
    pub donation_id: Uuid,
    pub campaign_id: Uuid,
    pub donor_id: Option<Uuid>,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub transaction_id: Option<String>,
    pub anonymous: bool,
    pub message: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// Payment channels accepted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case", type_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Wave,
    Orange,
    Card,
    BankTransfer,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Wave => "wave",
            PaymentMethod::Orange => "orange",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Paypal => "paypal",
        }
    }

    /// Uppercase label used in synthetic transaction ids.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Wave => "WAVE",
            PaymentMethod::Orange => "ORANGE",
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Paypal => "PAYPAL",
        }
    }
}

/// A payment method string outside the accepted enumeration.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wave" => Ok(PaymentMethod::Wave),
            "orange" => Ok(PaymentMethod::Orange),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Donation payment status.
///
/// `Refunded` is part of the enumeration for forward compatibility; no code
/// path currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase", type_name = "donation_status")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DonationStatus::Pending)
    }
}

/// Insert a new pending donation.
#[derive(Debug, Clone)]
pub struct DonationInsert {
    pub campaign_id: Uuid,
    pub donor_id: Option<Uuid>,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub anonymous: bool,
    pub message: Option<String>,
}

impl Processor<DonationInsert> for DatabaseProcessor {
    type Output = Donation;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DonationInsert")]
    async fn process(&self, insert: DonationInsert) -> Result<Donation, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations
                (campaign_id, donor_id, amount, payment_method, anonymous, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(insert.campaign_id)
        .bind(insert.donor_id)
        .bind(insert.amount)
        .bind(insert.payment_method)
        .bind(insert.anonymous)
        .bind(insert.message)
        .fetch_one(&self.pool)
        .await
    }
}

/// Look up a donation by id.
#[derive(Debug, Clone, Copy)]
pub struct GetDonationById {
    pub donation_id: Uuid,
}

impl Processor<GetDonationById> for DatabaseProcessor {
    type Output = Option<Donation>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetDonationById")]
    async fn process(&self, query: GetDonationById) -> Result<Option<Donation>, sqlx::Error> {
        sqlx::query_as::<_, Donation>(r#"SELECT * FROM donations WHERE donation_id = $1"#)
            .bind(query.donation_id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Move a pending donation to a terminal status and, on `completed`,
/// credit its campaign.
///
/// The update is conditional on the current status still being `pending`,
/// so a re-delivered webhook cannot re-apply a terminal transition.
/// Returns `None` when the donation is unknown or already terminal.
///
/// The transition and the campaign credit run on one transaction: a failure
/// anywhere rolls back the whole settlement, so the donation stays `pending`
/// and a retried delivery credits the campaign exactly once.
#[derive(Debug, Clone)]
pub struct SettleDonation {
    pub donation_id: Uuid,
    pub status: DonationStatus,
    pub transaction_id: String,
}

/// A freshly settled donation plus whether its campaign absorbed the amount.
#[derive(Debug, Clone)]
pub struct SettledDonation {
    pub donation: Donation,
    pub campaign_credited: bool,
}

impl Processor<SettleDonation> for DatabaseProcessor {
    type Output = Option<SettledDonation>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SettleDonation")]
    async fn process(
        &self,
        update: SettleDonation,
    ) -> Result<Option<SettledDonation>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(donation) = sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET status = $2, transaction_id = $3, updated_at = now()
            WHERE donation_id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(update.donation_id)
        .bind(update.status)
        .bind(update.transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let campaign_credited = if credits_campaign(donation.status) {
            campaign::credit_completed_donation(&mut *tx, donation.campaign_id, donation.amount)
                .await?
        } else {
            false
        };

        tx.commit().await?;
        Ok(Some(SettledDonation {
            donation,
            campaign_credited,
        }))
    }
}

/// Only a donation settling into `completed` counts toward its campaign's
/// `collected` sum.
fn credits_campaign(status: DonationStatus) -> bool {
    status == DonationStatus::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn method_round_trips_through_str() {
        for method in [
            PaymentMethod::Wave,
            PaymentMethod::Orange,
            PaymentMethod::Card,
            PaymentMethod::BankTransfer,
            PaymentMethod::Paypal,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()).ok(), Some(method));
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = PaymentMethod::from_str("bitcoin").unwrap_err();
        assert_eq!(err.0, "bitcoin");
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!DonationStatus::Pending.is_terminal());
        assert!(DonationStatus::Completed.is_terminal());
        assert!(DonationStatus::Failed.is_terminal());
        assert!(DonationStatus::Refunded.is_terminal());
    }

    #[test]
    fn only_completed_settlements_credit_the_campaign() {
        assert!(credits_campaign(DonationStatus::Completed));
        assert!(!credits_campaign(DonationStatus::Failed));
        assert!(!credits_campaign(DonationStatus::Refunded));
        assert!(!credits_campaign(DonationStatus::Pending));
    }
}
