//! Local mock checkout fallback.
//!
//! When no real integration is configured or reachable, the payer is sent
//! to a same-origin page that lets a human simulate the provider's webhook
//! by hand. The donation flow is never blocked by a missing integration.

use super::SessionRequest;
use url::Url;

/// Build the mock checkout URL carrying the session parameters verbatim.
pub fn checkout_url(request: &SessionRequest) -> Result<Url, url::ParseError> {
    let mut url = request.base_url.join("/api/checkout/mock")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("donation", &request.donation_id.to_string());
        pairs.append_pair("method", request.method.as_str());
        pairs.append_pair("amount", &request.amount.to_string());
        if let Some(return_url) = &request.return_url {
            pairs.append_pair("returnUrl", return_url.as_str());
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::donation::PaymentMethod;
    use uuid::Uuid;

    #[test]
    fn url_carries_all_session_parameters() {
        let donation_id = Uuid::new_v4();
        let request = SessionRequest {
            donation_id,
            method: PaymentMethod::Wave,
            amount: 5000,
            return_url: Url::parse("https://commune.example.org/donations/merci").ok(),
            base_url: Url::parse("http://192.168.1.10:8080").expect("static url"),
        };

        let url = checkout_url(&request).expect("mock url");
        assert!(url.as_str().starts_with("http://192.168.1.10:8080/api/checkout/mock?"));

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("donation".into(), donation_id.to_string())));
        assert!(pairs.contains(&("method".into(), "wave".into())));
        assert!(pairs.contains(&("amount".into(), "5000".into())));
        assert!(pairs.contains(&(
            "returnUrl".into(),
            "https://commune.example.org/donations/merci".into()
        )));
    }

    #[test]
    fn return_url_is_optional() {
        let request = SessionRequest {
            donation_id: Uuid::new_v4(),
            method: PaymentMethod::Card,
            amount: 1,
            return_url: None,
            base_url: Url::parse("http://localhost:8080").expect("static url"),
        };
        let url = checkout_url(&request).expect("mock url");
        assert!(url.query_pairs().all(|(k, _)| k != "returnUrl"));
    }
}
