use axum::{extract::State, response::Response};

use crate::{
    responses::PageResponse,
    routes::{pages, session::ClientSession},
    state::AppState,
};

pub async fn dashboard_handler(State(state): State<AppState>, session: ClientSession) -> Response {
    if session.is_new {
        return PageResponse::redirect("/signup");
    }

    match state.verification.current_email(session.id).await {
        Ok(Some(email)) => PageResponse::page(pages::dashboard_page(&email)),
        Ok(None) => PageResponse::redirect("/signup"),
        Err(err) => {
            tracing::error!(error = %err, session_id = %session.id, "Failed to load dashboard");
            PageResponse::server_error("Something went wrong")
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::router;
    use crate::routes::test_support::{body_text, get, post_form, session_cookie};
    use crate::services::mailer::MockMailer;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn dashboard_without_session_redirects() {
        let (state, _) = test_state(MockMailer::default());
        let app = router(state);

        let res = get(&app, "/dashboard", None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/signup");
    }

    #[tokio::test]
    async fn dashboard_shows_session_email() {
        let (state, _) = test_state(MockMailer::default());
        let app = router(state);

        let res = post_form(&app, "/signup", "email=a%40b.com", None).await;
        let cookie = session_cookie(&res).unwrap();

        let res = get(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()["cache-control"],
            "no-store, no-cache, must-revalidate"
        );
        assert!(body_text(res).await.contains("a@b.com"));
    }

    #[tokio::test]
    async fn dashboard_after_logout_redirects() {
        let (state, _) = test_state(MockMailer::default());
        let app = router(state);

        let res = post_form(&app, "/signup", "email=a%40b.com", None).await;
        let cookie = session_cookie(&res).unwrap();
        post_form(&app, "/logout", "", Some(&cookie)).await;

        let res = get(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/signup");
    }
}
