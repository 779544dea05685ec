use axum::{
    http::header,
    response::{IntoResponse, Response},
};

const SCRIPT_JS: &str = include_str!("../../static/script.js");

pub async fn script_js() -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        SCRIPT_JS,
    )
        .into_response()
}
