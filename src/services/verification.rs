use std::sync::Arc;

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::mailer::{MailError, Mailer};
use crate::session::{SessionStore, SessionStoreError, VerificationSession};
use crate::utils::otp::{generate_otp, otp_matches, OTP_EXPIRY_SECONDS};

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("OTP email delivery failed: {0}")]
    DeliveryFailure(#[source] MailError),
    #[error("No signup in progress")]
    NoActiveSignup,
    #[error("No OTP generated. Go to signup.")]
    NoOtpGenerated,
    #[error("OTP expired! Please resend.")]
    OtpExpired,
    #[error("Invalid OTP. Try again.")]
    OtpMismatch,
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Signup / resend / verify / logout over one session store and one mailer.
pub struct VerificationService {
    sessions: Arc<dyn SessionStore>,
    mailer: Arc<dyn Mailer>,
    otp_ttl: Duration,
}

impl VerificationService {
    pub fn new(sessions: Arc<dyn SessionStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            sessions,
            mailer,
            otp_ttl: Duration::seconds(OTP_EXPIRY_SECONDS),
        }
    }

    pub fn otp_ttl(&self) -> Duration {
        self.otp_ttl
    }

    /// Current state of a session; unknown ids read as an empty session.
    pub async fn session(&self, session_id: Uuid) -> Result<VerificationSession, VerificationError> {
        Ok(self.sessions.load(session_id).await?.unwrap_or_default())
    }

    pub async fn current_email(&self, session_id: Uuid) -> Result<Option<String>, VerificationError> {
        Ok(self.session(session_id).await?.email)
    }

    pub async fn start_signup(
        &self,
        session_id: Uuid,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<(), VerificationError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(VerificationError::InvalidEmail);
        }

        let session = self.session(session_id).await?;
        self.issue_and_send(session_id, session, email, now).await
    }

    pub async fn resend_otp(
        &self,
        session_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<(), VerificationError> {
        let session = self.session(session_id).await?;
        let email = session
            .email
            .clone()
            .ok_or(VerificationError::NoActiveSignup)?;

        self.issue_and_send(session_id, session, &email, now).await
    }

    pub async fn verify_otp(
        &self,
        session_id: Uuid,
        submitted: &str,
        now: OffsetDateTime,
    ) -> Result<(), VerificationError> {
        let mut session = self.session(session_id).await?;

        let otp = session.otp.ok_or(VerificationError::NoOtpGenerated)?;
        match session.otp_expiry {
            Some(expiry) if now <= expiry => {}
            _ => {
                info!(%session_id, "Rejected expired OTP");
                return Err(VerificationError::OtpExpired);
            }
        }

        if !otp_matches(otp, submitted) {
            info!(%session_id, "Rejected mismatched OTP");
            return Err(VerificationError::OtpMismatch);
        }

        session.verified = true;
        self.sessions.save(session_id, session).await?;
        info!(%session_id, "Email verified");
        Ok(())
    }

    pub async fn logout(&self, session_id: Uuid) -> Result<(), VerificationError> {
        self.sessions.clear(session_id).await?;
        info!(%session_id, "Session cleared");
        Ok(())
    }

    // The new code is stored before delivery is attempted, so a failed send
    // still leaves a session that can be resent.
    async fn issue_and_send(
        &self,
        session_id: Uuid,
        mut session: VerificationSession,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<(), VerificationError> {
        let otp = generate_otp();
        session.issue_otp(email, otp, now + self.otp_ttl);
        self.sessions.save(session_id, session).await?;

        match self
            .mailer
            .send_otp_email(email, otp, self.otp_ttl.whole_seconds())
            .await
        {
            Ok(()) => {
                info!(%session_id, %email, "OTP issued");
                Ok(())
            }
            Err(error) => {
                warn!(%session_id, %email, %error, "Failed to deliver OTP email");
                Err(VerificationError::DeliveryFailure(error))
            }
        }
    }
}
