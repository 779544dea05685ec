use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

/// Plain-text and HTML replies for the form-driven pages.
pub struct PageResponse;

impl PageResponse {
    pub fn page(html: String) -> Response {
        (
            StatusCode::OK,
            [
                (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
                (header::PRAGMA, "no-cache"),
            ],
            Html(html),
        )
            .into_response()
    }

    pub fn success(msg: &str) -> Response {
        (StatusCode::OK, msg.to_string()).into_response()
    }

    pub fn bad_request(msg: &str) -> Response {
        (StatusCode::BAD_REQUEST, msg.to_string()).into_response()
    }

    pub fn bad_gateway(msg: &str) -> Response {
        (StatusCode::BAD_GATEWAY, msg.to_string()).into_response()
    }

    pub fn server_error(msg: &str) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()).into_response()
    }

    pub fn not_found(msg: &str) -> Response {
        (StatusCode::NOT_FOUND, msg.to_string()).into_response()
    }

    pub fn redirect(path: &str) -> Response {
        Redirect::to(path).into_response()
    }
}
