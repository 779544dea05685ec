use std::collections::HashSet;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Minimum acceptable size for the session signing secret in bytes.
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected in the secret to avoid trivially guessable values.
const MIN_UNIQUE_SECRET_BYTES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionSecretError {
    #[error("SESSION_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "SESSION_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

/// HMAC key used to make the session cookie tamper-evident.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, SessionSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            secret: bytes.to_vec(),
        })
    }

    /// Fresh random key. Cookies signed with it do not survive a restart.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill(&mut bytes[..]);
        Self {
            secret: bytes.to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Encodes `session_id` as `<uuid>.<signature>` for the cookie value.
    pub fn sign(&self, session_id: Uuid) -> String {
        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", session_id, signature)
    }

    /// Returns the session id carried by a cookie value if its signature checks out.
    pub fn verify(&self, value: &str) -> Option<Uuid> {
        let (id, signature) = value.split_once('.')?;
        let session_id = Uuid::parse_str(id).ok()?;
        let provided = BASE64_URL_SAFE_NO_PAD.decode(signature.as_bytes()).ok()?;

        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        let expected = mac.finalize().into_bytes();

        if expected.as_slice().ct_eq(provided.as_slice()).unwrap_u8() == 1 {
            Some(session_id)
        } else {
            None
        }
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), SessionSecretError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(SessionSecretError::TooShort {
            actual: secret.len(),
            required: MIN_SESSION_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_SECRET_BYTES {
        return Err(SessionSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_SECRET_BYTES,
        });
    }

    Ok(())
}
