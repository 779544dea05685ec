use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::services::mailer::{MailError, Mailer};

pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Clone)]
pub struct SendgridMailer {
    api_key: Option<String>,
    from: String,
    base_url: String,
    http: Client,
}

impl SendgridMailer {
    /// A missing API key is not fatal here; every send then fails with
    /// `MailError::MissingCredentials`.
    pub fn new(http: &Client, api_key: Option<String>, from: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            from: from.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http.clone(),
        }
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MailError::MissingCredentials("SENDGRID_API_KEY".into()))?;

        let payload = json!({
            "personalizations": [ { "to": [ { "email": to } ] } ],
            "from": { "email": self.from },
            "subject": subject,
            "content": [ { "type": "text/html", "value": html_body } ]
        });

        let resp = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::SendError(e.to_string()))?;

        if resp.status().is_success() {
            tracing::info!(%to, status = %resp.status(), "OTP email accepted by SendGrid");
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(MailError::SendError(format!(
                "SendGrid send failed: {} {}",
                status, text
            )))
        }
    }
}

#[async_trait]
impl Mailer for SendgridMailer {
    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        self.send(to, subject, html_body).await
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
