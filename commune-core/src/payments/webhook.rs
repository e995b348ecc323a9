//! Interpretation of asynchronous payment provider callbacks.
//!
//! Providers disagree on payload shape, and the aggregator's sandbox and
//! live payloads nest custom data differently, so the donation reference is
//! resolved through an ordered list of extraction paths, first match wins.

use crate::entities::donation::PaymentMethod;
use serde_json::Value;
use uuid::Uuid;

/// Known locations of the donation reference, in probe order.
pub const DONATION_ID_PATHS: &[&[&str]] = &[
    &["invoice", "custom_data", "donationId"],
    &["custom_data", "donationId"],
    &["data", "custom_data", "donationId"],
    &["data", "invoice", "custom_data", "donationId"],
    &["donationId"],
];

/// Walk a nested object path.
pub fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |node, key| node.get(key))
}

/// Return the value at the first path that resolves.
pub fn first_match<'a>(payload: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| value_at(payload, path))
}

/// Which webhook endpoint received the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookSource {
    /// The centralizing aggregator's IPN endpoint.
    Aggregator,
    /// A provider-specific endpoint.
    Provider(PaymentMethod),
}

impl WebhookSource {
    /// Uppercase label stamped into synthetic transaction ids.
    pub fn label(&self) -> &'static str {
        match self {
            WebhookSource::Aggregator => "AGGREGATOR",
            WebhookSource::Provider(method) => method.label(),
        }
    }
}

impl std::fmt::Display for WebhookSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Malformed or unresolvable webhook input. Maps to HTTP 400.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WebhookParseError {
    #[error("payload carries no donation reference")]
    MissingReference,
    #[error("donation reference is not a valid id: {0}")]
    InvalidReference(String),
}

/// The provider's verdict extracted from a callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookOutcome {
    pub donation_id: Uuid,
    pub success: bool,
}

/// Extract the donation reference and success verdict from a raw payload.
pub fn interpret(payload: &Value) -> Result<WebhookOutcome, WebhookParseError> {
    Ok(WebhookOutcome {
        donation_id: extract_donation_id(payload)?,
        success: is_success(payload),
    })
}

/// Resolve the donation reference through [`DONATION_ID_PATHS`].
pub fn extract_donation_id(payload: &Value) -> Result<Uuid, WebhookParseError> {
    let value = first_match(payload, DONATION_ID_PATHS)
        .ok_or(WebhookParseError::MissingReference)?;
    let raw = value
        .as_str()
        .ok_or_else(|| WebhookParseError::InvalidReference(value.to_string()))?;
    Uuid::parse_str(raw).map_err(|_| WebhookParseError::InvalidReference(raw.to_owned()))
}

/// Determine the success verdict from provider-specific signals.
///
/// Any one match is sufficient: an explicit status string, a response code,
/// or a boolean success flag, checked both at top level and under `data`.
pub fn is_success(payload: &Value) -> bool {
    success_signals(payload)
        || payload.get("data").is_some_and(success_signals)
}

fn success_signals(node: &Value) -> bool {
    let status = node
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| {
            s.eq_ignore_ascii_case("completed")
                || s.eq_ignore_ascii_case("approved")
                || s.eq_ignore_ascii_case("success")
        });

    let response_code = node.get("response_code").and_then(Value::as_str) == Some("00");

    let code = match node.get("code") {
        Some(Value::Number(n)) => n.as_i64() == Some(200),
        Some(Value::String(s)) => s == "200" || s == "00",
        _ => false,
    };

    let flag = node.get("success").and_then(Value::as_bool) == Some(true);

    status || response_code || code || flag
}

/// Synthetic transaction id for a settled donation:
/// `{PROVIDER}_{unix_millis}` on success, `{PROVIDER}_FAIL_{unix_millis}`
/// on failure.
pub fn transaction_id(source: WebhookSource, success: bool) -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format_transaction_id(source.label(), success, millis)
}

fn format_transaction_id(label: &str, success: bool, millis: i128) -> String {
    if success {
        format!("{label}_{millis}")
    } else {
        format!("{label}_FAIL_{millis}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "6a1f4f7e-32a8-4f4a-9c80-54a09d9c2e01";

    #[test]
    fn extracts_from_every_known_path() {
        let payloads = [
            json!({"invoice": {"custom_data": {"donationId": ID}}}),
            json!({"custom_data": {"donationId": ID}}),
            json!({"data": {"custom_data": {"donationId": ID}}}),
            json!({"data": {"invoice": {"custom_data": {"donationId": ID}}}}),
            json!({"donationId": ID}),
        ];
        for payload in payloads {
            assert_eq!(
                extract_donation_id(&payload).ok(),
                Uuid::parse_str(ID).ok(),
                "failed on {payload}"
            );
        }
    }

    #[test]
    fn first_matching_path_wins() {
        let other = "00000000-0000-0000-0000-000000000001";
        let payload = json!({
            "invoice": {"custom_data": {"donationId": ID}},
            "donationId": other,
        });
        assert_eq!(
            extract_donation_id(&payload).ok(),
            Uuid::parse_str(ID).ok()
        );
    }

    #[test]
    fn missing_reference_is_an_error() {
        let payload = json!({"status": "completed"});
        assert!(matches!(
            extract_donation_id(&payload),
            Err(WebhookParseError::MissingReference)
        ));
    }

    #[test]
    fn non_uuid_reference_is_rejected() {
        let payload = json!({"donationId": "not-a-uuid"});
        assert!(matches!(
            extract_donation_id(&payload),
            Err(WebhookParseError::InvalidReference(_))
        ));
    }

    #[test]
    fn any_single_signal_means_success() {
        for payload in [
            json!({"status": "completed"}),
            json!({"status": "APPROVED"}),
            json!({"status": "Success"}),
            json!({"response_code": "00"}),
            json!({"code": 200}),
            json!({"code": "200"}),
            json!({"success": true}),
            json!({"data": {"status": "completed"}}),
        ] {
            assert!(is_success(&payload), "expected success for {payload}");
        }
    }

    #[test]
    fn anything_else_is_failure() {
        for payload in [
            json!({}),
            json!({"status": "cancelled"}),
            json!({"response_code": "01"}),
            json!({"code": 500}),
            json!({"success": false}),
            json!({"status": 200}),
        ] {
            assert!(!is_success(&payload), "expected failure for {payload}");
        }
    }

    #[test]
    fn transaction_id_shapes() {
        assert_eq!(
            format_transaction_id("WAVE", true, 1700000000000),
            "WAVE_1700000000000"
        );
        assert_eq!(
            format_transaction_id("ORANGE", false, 1700000000000),
            "ORANGE_FAIL_1700000000000"
        );

        let id = transaction_id(WebhookSource::Aggregator, false);
        assert!(id.starts_with("AGGREGATOR_FAIL_"));
        assert!(
            id.trim_start_matches("AGGREGATOR_FAIL_")
                .chars()
                .all(|c| c.is_ascii_digit())
        );
    }

    #[test]
    fn source_labels() {
        use crate::entities::donation::PaymentMethod;
        assert_eq!(WebhookSource::Aggregator.label(), "AGGREGATOR");
        assert_eq!(
            WebhookSource::Provider(PaymentMethod::BankTransfer).label(),
            "BANK_TRANSFER"
        );
    }
}
