use rand::Rng;
use subtle::ConstantTimeEq;

/// Smallest code handed out; keeps every code at exactly six digits.
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Seconds an issued code stays valid.
pub const OTP_EXPIRY_SECONDS: i64 = 120;

pub fn generate_otp() -> u32 {
    rand::rng().random_range(OTP_MIN..=OTP_MAX)
}

/// Compares a user-submitted code with the stored one over their canonical
/// decimal text. Surrounding whitespace in the submission is ignored.
pub fn otp_matches(stored: u32, submitted: &str) -> bool {
    let expected = stored.to_string();
    let provided = submitted.trim();

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
