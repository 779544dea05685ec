pub mod otp;
pub mod session_token;
