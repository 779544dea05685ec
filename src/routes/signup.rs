use axum::{
    extract::{Form, State},
    response::Response,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    responses::PageResponse,
    routes::{
        pages,
        session::{attach_session_cookie, ClientSession},
    },
    services::verification::VerificationError,
    state::AppState,
};

pub const SIGNUP_DELIVERY_FAILED: &str = "Failed to send OTP. Please try again.";

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
}

pub async fn signup_form() -> Response {
    PageResponse::page(pages::signup_page())
}

pub async fn handle_signup(
    State(state): State<AppState>,
    session: ClientSession,
    Form(form): Form<SignupForm>,
) -> Response {
    let result = state
        .verification
        .start_signup(session.id, &form.email, OffsetDateTime::now_utc())
        .await;

    let response = match result {
        Ok(()) => PageResponse::redirect("/verify"),
        Err(err @ VerificationError::InvalidEmail) => PageResponse::bad_request(&err.to_string()),
        Err(VerificationError::DeliveryFailure(_)) => {
            PageResponse::bad_gateway(SIGNUP_DELIVERY_FAILED)
        }
        Err(err) => {
            tracing::error!(error = %err, session_id = %session.id, "Signup failed");
            PageResponse::server_error("Something went wrong")
        }
    };

    // Even a failed send leaves the email in the session for /resend.
    attach_session_cookie(response, session, &state)
}
