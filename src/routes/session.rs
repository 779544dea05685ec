use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "otp_session";

/// Session id resolved from the signed cookie. Requests without a valid
/// cookie get a fresh id that is only persisted once a handler writes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSession {
    pub id: Uuid,
    pub is_new: bool,
}

impl FromRequestParts<AppState> for ClientSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.session_keys.verify(cookie.value()));

        Ok(match existing {
            Some(id) => ClientSession { id, is_new: false },
            None => {
                if jar.get(SESSION_COOKIE).is_some() {
                    tracing::warn!("Ignoring session cookie with invalid signature");
                }
                ClientSession {
                    id: Uuid::new_v4(),
                    is_new: true,
                }
            }
        })
    }
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn append_cookie(response: &mut Response, cookie: Cookie<'static>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(error) => tracing::error!(%error, "Failed to encode session cookie"),
    }
}

/// Issues the signed cookie when the session was created by this request.
pub fn attach_session_cookie(
    mut response: Response,
    session: ClientSession,
    state: &AppState,
) -> Response {
    if session.is_new {
        let value = state.session_keys.sign(session.id);
        append_cookie(
            &mut response,
            session_cookie(value, state.config.session_cookie_secure),
        );
    }
    response
}

pub fn expire_session_cookie(mut response: Response, state: &AppState) -> Response {
    let mut cookie = session_cookie(String::new(), state.config.session_cookie_secure);
    cookie.set_max_age(TimeDuration::seconds(0));
    append_cookie(&mut response, cookie);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::PageResponse;
    use crate::services::mailer::MockMailer;
    use crate::state::test_support::test_state;
    use axum::http::{header, Request};

    fn parts_with_cookie(cookie: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn valid_cookie_resolves_existing_session() {
        let (state, _) = test_state(MockMailer::default());
        let id = Uuid::new_v4();
        let cookie = format!("{}={}", SESSION_COOKIE, state.session_keys.sign(id));

        let mut parts = parts_with_cookie(Some(cookie));
        let session = ClientSession::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        assert_eq!(session, ClientSession { id, is_new: false });
    }

    #[tokio::test]
    async fn missing_or_forged_cookie_starts_new_session() {
        let (state, _) = test_state(MockMailer::default());
        let forged = format!("{}={}.forged", SESSION_COOKIE, Uuid::new_v4());

        for cookie in [None, Some(forged)] {
            let mut parts = parts_with_cookie(cookie);
            let session = ClientSession::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
            assert!(session.is_new);
        }
    }

    #[test]
    fn new_session_gets_signed_cookie() {
        let (state, _) = test_state(MockMailer::default());
        let session = ClientSession {
            id: Uuid::new_v4(),
            is_new: true,
        };

        let resp = attach_session_cookie(PageResponse::redirect("/verify"), session, &state);
        let set_cookie = resp.headers()["set-cookie"].to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{}={}", SESSION_COOKIE, session.id)));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Path=/"));
    }

    #[test]
    fn existing_session_does_not_reissue_cookie() {
        let (state, _) = test_state(MockMailer::default());
        let session = ClientSession {
            id: Uuid::new_v4(),
            is_new: false,
        };

        let resp = attach_session_cookie(PageResponse::redirect("/verify"), session, &state);
        assert!(resp.headers().get("set-cookie").is_none());
    }

    #[test]
    fn expired_cookie_clears_client_side() {
        let (state, _) = test_state(MockMailer::default());
        let resp = expire_session_cookie(PageResponse::redirect("/signup"), &state);
        let set_cookie = resp.headers()["set-cookie"].to_str().unwrap();
        assert!(set_cookie.contains(&format!("{}=", SESSION_COOKIE)));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
