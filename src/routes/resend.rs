use axum::{extract::State, response::Response};
use time::OffsetDateTime;

use crate::{
    responses::PageResponse, routes::session::ClientSession,
    services::verification::VerificationError, state::AppState,
};

pub const RESEND_DELIVERY_FAILED: &str = "Failed to resend OTP.";

pub async fn handle_resend(State(state): State<AppState>, session: ClientSession) -> Response {
    if session.is_new {
        return PageResponse::redirect("/signup");
    }

    match state
        .verification
        .resend_otp(session.id, OffsetDateTime::now_utc())
        .await
    {
        Ok(()) => PageResponse::redirect("/verify"),
        Err(VerificationError::NoActiveSignup) => PageResponse::redirect("/signup"),
        Err(VerificationError::DeliveryFailure(_)) => {
            PageResponse::bad_gateway(RESEND_DELIVERY_FAILED)
        }
        Err(err) => {
            tracing::error!(error = %err, session_id = %session.id, "Resend failed");
            PageResponse::server_error("Something went wrong")
        }
    }
}
