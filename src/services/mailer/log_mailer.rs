use async_trait::async_trait;
use tracing::info;

use crate::services::mailer::{MailError, Mailer};

/// Local diagnostic sender: writes codes to the log instead of emailing them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp_email(&self, to: &str, otp: u32, ttl_seconds: i64) -> Result<(), MailError> {
        info!(
            target: "otp_debug",
            %to,
            otp,
            expires_in_seconds = ttl_seconds,
            "DEBUG MODE - OTP generated (not sent via email)"
        );
        Ok(())
    }

    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        info!(
            target: "otp_debug",
            %to,
            %subject,
            body_len = html_body.len(),
            "DEBUG MODE - email not sent"
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_reports_delivery() {
        let mailer = LogMailer;
        assert!(mailer.send_otp_email("a@b.com", 123456, 120).await.is_ok());
        assert!(mailer
            .send_email_generic("a@b.com", "subject", "<p>x</p>")
            .await
            .is_ok());
    }
}
