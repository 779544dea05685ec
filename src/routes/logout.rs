use axum::{extract::State, response::Response};

use crate::{
    responses::PageResponse,
    routes::session::{expire_session_cookie, ClientSession},
    state::AppState,
};

pub async fn handle_logout(State(state): State<AppState>, session: ClientSession) -> Response {
    if !session.is_new {
        if let Err(err) = state.verification.logout(session.id).await {
            tracing::error!(error = %err, session_id = %session.id, "Failed to clear session");
        }
    }

    expire_session_cookie(PageResponse::redirect("/signup"), &state)
}
