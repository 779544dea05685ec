use std::{env, fmt, net::SocketAddr, str::FromStr};

use thiserror::Error;
use time::Duration;

use crate::services::mailer::DEFAULT_SENDGRID_BASE_URL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_EMAIL_FROM: &str = "no-reply@localhost";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Unsupported EMAIL_PROVIDER: {0} (expected 'sendgrid' or 'smtp')")]
    UnsupportedProvider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Sendgrid,
    Smtp,
}

impl FromStr for EmailProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sendgrid" => Ok(EmailProvider::Sendgrid),
            "smtp" => Ok(EmailProvider::Smtp),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmailProvider::Sendgrid => "sendgrid",
            EmailProvider::Smtp => "smtp",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub provider: EmailProvider,
    pub from: String,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_base_url: String,
    pub smtp: Option<SmtpSettings>,
    /// Recipient for the `/test-email` diagnostic route.
    pub test_recipient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` means a random key is generated at startup.
    pub session_secret: Option<String>,
    pub session_cookie_secure: bool,
    /// `None` disables the idle-session purge.
    pub session_idle: Option<Duration>,
    /// Log codes instead of emailing them.
    pub otp_debug_mode: bool,
    pub email: EmailSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let idle_minutes = match get("SESSION_IDLE_MINUTES") {
            Some(raw) => raw.parse::<i64>().map_err(|_| ConfigError::Invalid {
                key: "SESSION_IDLE_MINUTES",
                value: raw,
            })?,
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };
        let session_idle = (idle_minutes > 0).then(|| Duration::minutes(idle_minutes));

        let provider = match get("EMAIL_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => EmailProvider::Sendgrid,
        };

        let smtp = match provider {
            // Without a host the mailer falls back to failing every send.
            EmailProvider::Smtp => match get("SMTP_HOST") {
                Some(host) => {
                    let port = match get("SMTP_PORT") {
                        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                            key: "SMTP_PORT",
                            value: raw,
                        })?,
                        None => DEFAULT_SMTP_PORT,
                    };
                    Some(SmtpSettings {
                        host,
                        port,
                        username: get("SMTP_USERNAME"),
                        password: get("SMTP_PASSWORD"),
                        tls_disabled: parse_flag(&get, "SMTP_TLS_DISABLED")?,
                    })
                }
                None => None,
            },
            EmailProvider::Sendgrid => None,
        };

        let email = EmailSettings {
            provider,
            from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            sendgrid_api_key: get("SENDGRID_API_KEY"),
            sendgrid_base_url: get("SENDGRID_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SENDGRID_BASE_URL.to_string()),
            smtp,
            test_recipient: get("EMAIL_TEST_RECIPIENT"),
        };

        Ok(Config {
            bind_addr,
            session_secret: get("SESSION_SECRET"),
            session_cookie_secure: parse_flag(&get, "SESSION_COOKIE_SECURE")?,
            session_idle,
            otp_debug_mode: parse_flag(&get, "OTP_DEBUG_MODE")?,
            email,
        })
    }
}

fn parse_flag<G>(get: &G, key: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(false),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}
