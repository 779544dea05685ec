use async_trait::async_trait;
use lettre::address::AddressError;
use std::any::Any;
use thiserror::Error;

mod log_mailer;
mod mock_mailer;
mod sendgrid_mailer;
mod smtp_impl;

pub use log_mailer::LogMailer;
pub use mock_mailer::{MockMailer, RecordedEmail};
pub use sendgrid_mailer::{SendgridMailer, DEFAULT_SENDGRID_BASE_URL};
pub use smtp_impl::SmtpMailer;

pub const OTP_EMAIL_SUBJECT: &str = "Your OTP Verification Code";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Invalid Address: {0}")]
    InvalidEmailAddress(String),
    #[error("Send error: {0}")]
    SendError(String),
    #[error("Error: {0}")]
    Other(String),
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<AddressError> for MailError {
    fn from(e: AddressError) -> Self {
        MailError::InvalidEmailAddress(e.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers the passcode email. `ttl_seconds` is the advertised validity window.
    async fn send_otp_email(&self, to: &str, otp: u32, ttl_seconds: i64) -> Result<(), MailError> {
        let body = render_otp_email(otp, ttl_seconds);
        self.send_email_generic(to, OTP_EMAIL_SUBJECT, &body).await
    }

    /// Sends an HTML message. `Ok` means the provider accepted it.
    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError>;

    fn as_any(&self) -> &dyn Any;
}

pub fn render_otp_email(otp: u32, ttl_seconds: i64) -> String {
    format!(
        concat!(
            r#"<div style="background:#0f172a;padding:20px;border-radius:10px;color:white;font-family:Arial;">"#,
            r#"<h2 style="color:#38bdf8;">Verify Your Email</h2>"#,
            r#"<p>Your OTP:</p><h1 style="font-size:32px;letter-spacing:4px;">{otp}</h1>"#,
            r#"<p>Expires in <b>{ttl} seconds</b>.</p>"#,
            "</div>"
        ),
        otp = otp,
        ttl = ttl_seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_email_embeds_code_and_window() {
        let body = render_otp_email(493021, 120);
        assert!(body.contains(">493021</h1>"));
        assert!(body.contains("120 seconds"));
    }

    #[tokio::test]
    async fn default_otp_email_goes_through_generic_send() {
        let mailer = MockMailer::default();
        mailer.send_otp_email("a@b.com", 777001, 120).await.unwrap();

        let sent = mailer.sent_emails.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(sent[0].subject, OTP_EMAIL_SUBJECT);
        assert!(sent[0].body.contains("777001"));
    }

    #[test]
    fn mail_errors_display_their_cause() {
        let err = MailError::MissingCredentials("SENDGRID_API_KEY".into());
        assert_eq!(err.to_string(), "Missing credentials: SENDGRID_API_KEY");
    }
}
