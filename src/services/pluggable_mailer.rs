use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::config::{EmailProvider, EmailSettings};
use crate::services::mailer::{LogMailer, MailError, Mailer, SendgridMailer, SmtpMailer};

#[derive(Clone)]
enum AppSender {
    Log(LogMailer),
    Sendgrid(Arc<SendgridMailer>),
    Smtp(Arc<SmtpMailer>),
    // Provider could not be built from the configuration; every send fails.
    Unavailable(String),
}

/// Picks the email transport once at startup from configuration.
#[derive(Clone)]
pub struct PluggableMailer {
    app_sender: AppSender,
}

impl PluggableMailer {
    pub fn from_settings(settings: &EmailSettings, debug_mode: bool, http: &Client) -> Self {
        if debug_mode {
            tracing::warn!("OTP debug mode is on: codes are logged, not emailed");
            return Self {
                app_sender: AppSender::Log(LogMailer),
            };
        }

        let app_sender = match settings.provider {
            EmailProvider::Sendgrid => {
                if settings.sendgrid_api_key.is_none() {
                    tracing::error!("SENDGRID_API_KEY not found; OTP emails will fail to send");
                }
                AppSender::Sendgrid(Arc::new(SendgridMailer::new(
                    http,
                    settings.sendgrid_api_key.clone(),
                    &settings.from,
                    &settings.sendgrid_base_url,
                )))
            }
            EmailProvider::Smtp => match settings.smtp.as_ref() {
                Some(smtp) => match SmtpMailer::new(smtp, &settings.from) {
                    Ok(mailer) => AppSender::Smtp(Arc::new(mailer)),
                    Err(error) => {
                        tracing::error!(%error, host = %smtp.host, "Failed to configure SMTP mailer");
                        AppSender::Unavailable(error.to_string())
                    }
                },
                None => {
                    tracing::error!("SMTP provider selected without SMTP settings");
                    AppSender::Unavailable("SMTP settings missing".into())
                }
            },
        };

        Self { app_sender }
    }

    pub fn provider_name(&self) -> &'static str {
        match &self.app_sender {
            AppSender::Log(_) => "log",
            AppSender::Sendgrid(_) => "sendgrid",
            AppSender::Smtp(_) => "smtp",
            AppSender::Unavailable(_) => "unavailable",
        }
    }
}

#[async_trait]
impl Mailer for PluggableMailer {
    async fn send_otp_email(&self, to: &str, otp: u32, ttl_seconds: i64) -> Result<(), MailError> {
        match &self.app_sender {
            AppSender::Log(log) => log.send_otp_email(to, otp, ttl_seconds).await,
            AppSender::Sendgrid(sg) => sg.send_otp_email(to, otp, ttl_seconds).await,
            AppSender::Smtp(smtp) => smtp.send_otp_email(to, otp, ttl_seconds).await,
            AppSender::Unavailable(reason) => Err(MailError::MissingCredentials(reason.clone())),
        }
    }

    async fn send_email_generic(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        match &self.app_sender {
            AppSender::Log(log) => log.send_email_generic(to, subject, html_body).await,
            AppSender::Sendgrid(sg) => sg.send_email_generic(to, subject, html_body).await,
            AppSender::Smtp(smtp) => smtp.send_email_generic(to, subject, html_body).await,
            AppSender::Unavailable(reason) => Err(MailError::MissingCredentials(reason.clone())),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
