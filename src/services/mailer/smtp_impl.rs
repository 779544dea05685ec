use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::config::SmtpSettings;
use crate::services::mailer::Mailer;

use super::MailError;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, from: &str) -> Result<Self, MailError> {
        let sender: Mailbox = from.parse()?;

        let mailer = if settings.tls_disabled {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
                .build()
        } else {
            let (username, password) = match (&settings.username, &settings.password) {
                (Some(username), Some(password)) => (username.clone(), password.clone()),
                _ => {
                    return Err(MailError::MissingCredentials(
                        "SMTP_USERNAME and SMTP_PASSWORD".into(),
                    ))
                }
            };
            let creds = Credentials::new(username, password);
            let tls = TlsParameters::new(settings.host.clone())?;

            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
                .port(settings.port)
                .tls(Tls::Required(tls))
                .credentials(creds)
                .build()
        };

        Ok(Self {
            transport: Arc::new(mailer),
            sender,
        })
    }

    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(to
                .parse()
                .map_err(|e: AddressError| MailError::InvalidEmailAddress(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| e.into())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        self.send_email(to, subject, html_body).await
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "localhost".into(),
            port: 2525,
            username: None,
            password: None,
            tls_disabled: true,
        }
    }

    #[test]
    fn plain_relay_builds_without_credentials() {
        assert!(SmtpMailer::new(&settings(), "noreply@example.com").is_ok());
    }

    #[test]
    fn tls_relay_requires_credentials() {
        let settings = SmtpSettings {
            tls_disabled: false,
            ..settings()
        };
        let err = SmtpMailer::new(&settings, "noreply@example.com")
            .err()
            .expect("credentials are required");
        assert!(matches!(err, MailError::MissingCredentials(_)));
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let err = SmtpMailer::new(&settings(), "not an address")
            .err()
            .expect("sender must parse");
        assert!(matches!(err, MailError::InvalidEmailAddress(_)));
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_before_sending() {
        let mailer = SmtpMailer::new(&settings(), "noreply@example.com").unwrap();
        let err = mailer
            .send_email_generic("nope", "subject", "<p>body</p>")
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::InvalidEmailAddress(_)));
    }
}
