use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

/// Per-client verification state, keyed by the id carried in the signed session cookie.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationSession {
    pub email: Option<String>,
    pub otp: Option<u32>,
    pub otp_expiry: Option<OffsetDateTime>,
    pub verified: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    PendingVerification,
    Verified,
}

impl VerificationSession {
    pub fn state(&self) -> SessionState {
        match (&self.email, self.otp, self.verified) {
            (Some(_), _, true) => SessionState::Verified,
            (Some(_), Some(_), false) => SessionState::PendingVerification,
            _ => SessionState::Anonymous,
        }
    }

    /// Replaces the current code. Any previously issued code stops working.
    pub fn issue_otp(&mut self, email: &str, otp: u32, expires_at: OffsetDateTime) {
        self.email = Some(email.to_string());
        self.otp = Some(otp);
        self.otp_expiry = Some(expires_at);
        self.verified = false;
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: Uuid)
        -> Result<Option<VerificationSession>, SessionStoreError>;
    async fn save(
        &self,
        session_id: Uuid,
        session: VerificationSession,
    ) -> Result<(), SessionStoreError>;
    /// Drops everything stored for the session. Returns whether anything was removed.
    async fn clear(&self, session_id: Uuid) -> Result<bool, SessionStoreError>;
}

#[derive(Clone, Debug)]
struct StoredSession {
    session: VerificationSession,
    touched_at: OffsetDateTime,
}

/// Process-local store. Sessions vanish on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: DashMap<Uuid, StoredSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes sessions not written or read for longer than `max_idle`.
    pub fn purge_idle(&self, max_idle: Duration, now: OffsetDateTime) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, stored| now - stored.touched_at <= max_idle);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            info!(removed, "Purged idle sessions");
        }
        removed
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        session_id: Uuid,
    ) -> Result<Option<VerificationSession>, SessionStoreError> {
        match self.entries.get_mut(&session_id) {
            Some(mut stored) => {
                stored.touched_at = OffsetDateTime::now_utc();
                debug!(%session_id, "Session loaded");
                Ok(Some(stored.session.clone()))
            }
            None => {
                debug!(%session_id, "Session not found");
                Ok(None)
            }
        }
    }

    async fn save(
        &self,
        session_id: Uuid,
        session: VerificationSession,
    ) -> Result<(), SessionStoreError> {
        self.entries.insert(
            session_id,
            StoredSession {
                session,
                touched_at: OffsetDateTime::now_utc(),
            },
        );
        debug!(%session_id, "Session saved");
        Ok(())
    }

    async fn clear(&self, session_id: Uuid) -> Result<bool, SessionStoreError> {
        let removed = self.entries.remove(&session_id).is_some();
        debug!(%session_id, removed, "Session cleared");
        Ok(removed)
    }
}
