use axum::{
    extract::{Form, State},
    response::Response,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    responses::PageResponse,
    routes::{pages, session::ClientSession},
    services::verification::VerificationError,
    state::AppState,
};

#[derive(Deserialize)]
pub struct VerifyForm {
    #[serde(default)]
    pub otp: String,
}

pub async fn verify_form(State(state): State<AppState>) -> Response {
    PageResponse::page(pages::verify_page(
        state.verification.otp_ttl().whole_seconds(),
    ))
}

pub async fn handle_verify(
    State(state): State<AppState>,
    session: ClientSession,
    Form(form): Form<VerifyForm>,
) -> Response {
    match state
        .verification
        .verify_otp(session.id, &form.otp, OffsetDateTime::now_utc())
        .await
    {
        Ok(()) => PageResponse::redirect("/dashboard"),
        Err(
            err @ (VerificationError::NoOtpGenerated
            | VerificationError::OtpExpired
            | VerificationError::OtpMismatch),
        ) => PageResponse::bad_request(&err.to_string()),
        Err(err) => {
            tracing::error!(error = %err, session_id = %session.id, "OTP verification failed");
            PageResponse::server_error("Something went wrong")
        }
    }
}
