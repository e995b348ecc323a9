//! Server-rendered mock checkout page.
//!
//! Shown when no real payment integration is configured. Its two buttons
//! POST `{donationId, success}` to the corresponding provider webhook, then
//! follow the return URL if one was given, so the whole donation flow can
//! be exercised by hand.

use axum::extract::Query;
use axum::response::Html;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MockCheckoutParams {
    pub donation: Uuid,
    pub method: String,
    pub amount: i64,
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

/// `GET /api/checkout/mock?donation&method&amount&returnUrl`
pub async fn mock_checkout_page(Query(params): Query<MockCheckoutParams>) -> Html<String> {
    Html(render_page(&params))
}

fn render_page(params: &MockCheckoutParams) -> String {
    // Passed to the page script as JSON; `<` is escaped so a crafted
    // returnUrl cannot close the script tag.
    let config = serde_json::json!({
        "donationId": params.donation,
        "webhookPath": format!("/api/webhooks/{}", params.method),
        "returnUrl": params.return_url,
    })
    .to_string()
    .replace('<', "\\u003c");

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Paiement simulé</title>
<style>
  body {{ font-family: sans-serif; max-width: 28rem; margin: 4rem auto; text-align: center; }}
  button {{ font-size: 1rem; padding: .6rem 1.4rem; margin: .5rem; cursor: pointer; }}
  .ok {{ background: #2e7d32; color: white; border: none; }}
  .ko {{ background: #c62828; color: white; border: none; }}
  .hint {{ color: #666; font-size: .85rem; }}
</style>
</head>
<body>
<h1>Paiement simulé</h1>
<p>Don de <strong>{amount}</strong> via <strong>{method}</strong></p>
<p class="hint">Aucune intégration de paiement n'est configurée ; cette page simule la réponse du fournisseur.</p>
<button class="ok" onclick="settle(true)">Simuler un paiement réussi</button>
<button class="ko" onclick="settle(false)">Simuler un échec</button>
<p id="status" class="hint"></p>
<script>
const CHECKOUT = {config};
async function settle(success) {{
  const status = document.getElementById('status');
  try {{
    const response = await fetch(CHECKOUT.webhookPath, {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify({{ donationId: CHECKOUT.donationId, success }}),
    }});
    if (!response.ok) {{
      status.textContent = 'Webhook error: ' + response.status;
      return;
    }}
    if (CHECKOUT.returnUrl) {{
      window.location = CHECKOUT.returnUrl;
    }} else {{
      status.textContent = success ? 'Paiement enregistré.' : 'Échec enregistré.';
    }}
  }} catch (e) {{
    status.textContent = 'Webhook unreachable: ' + e;
  }}
}}
</script>
</body>
</html>
"#,
        amount = params.amount,
        method = escape_html(&params.method),
        config = config,
    )
}

fn escape_html(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_owned(),
            '<' => "&lt;".to_owned(),
            '>' => "&gt;".to_owned(),
            '"' => "&quot;".to_owned(),
            '\'' => "&#39;".to_owned(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> MockCheckoutParams {
        MockCheckoutParams {
            donation: Uuid::new_v4(),
            method: "wave".into(),
            amount: 5000,
            return_url: Some("https://commune.example.org/merci".into()),
        }
    }

    #[test]
    fn page_targets_the_provider_webhook() {
        let params = params();
        let page = render_page(&params);
        assert!(page.contains("/api/webhooks/wave"));
        assert!(page.contains(&params.donation.to_string()));
        assert!(page.contains("5000"));
        assert!(page.contains("https://commune.example.org/merci"));
    }

    #[test]
    fn method_is_html_escaped() {
        let mut params = params();
        params.method = "<script>alert(1)</script>".into();
        let page = render_page(&params);
        assert!(!page.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn return_url_cannot_close_the_script_tag() {
        let mut params = params();
        params.return_url = Some("</script><script>alert(1)</script>".into());
        let page = render_page(&params);
        assert!(!page.contains("</script><script>alert(1)"));
    }
}
