pub mod mailer;
pub mod pluggable_mailer;
pub mod verification;
