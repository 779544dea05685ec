pub mod assets;
pub mod dashboard;
pub mod logout;
pub mod pages;
pub mod resend;
pub mod session;
pub mod signup;
pub mod test_email;
pub mod verify;

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::responses::PageResponse;
use crate::state::AppState;

pub async fn home() -> Response {
    PageResponse::redirect("/signup")
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/signup",
            get(signup::signup_form).post(signup::handle_signup),
        )
        .route(
            "/verify",
            get(verify::verify_form).post(verify::handle_verify),
        )
        .route("/resend", get(resend::handle_resend))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route("/logout", post(logout::handle_logout))
        .route("/test-email", get(test_email::handle_test_email))
        .route("/static/script.js", get(assets::script_js))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
        Router,
    };
    use tower::ServiceExt;

    use crate::routes::session::SESSION_COOKIE;

    /// `name=value` of the session cookie set by a response.
    pub fn session_cookie(res: &Response) -> Option<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", SESSION_COOKIE)))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    pub async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(app: &Router, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(builder.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }
}
