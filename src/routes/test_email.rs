use axum::{extract::State, response::Response};

use crate::{responses::PageResponse, state::AppState, utils::otp::OTP_EXPIRY_SECONDS};

const SAMPLE_OTP: u32 = 123456;

/// Operator check that the configured provider can deliver mail.
pub async fn handle_test_email(State(state): State<AppState>) -> Response {
    let Some(recipient) = state.config.email.test_recipient.as_deref() else {
        return PageResponse::not_found("EMAIL_TEST_RECIPIENT not configured");
    };

    match state
        .mailer
        .send_otp_email(recipient, SAMPLE_OTP, OTP_EXPIRY_SECONDS)
        .await
    {
        Ok(()) => PageResponse::success("Test email sent!"),
        Err(error) => {
            tracing::warn!(%error, %recipient, "Test email failed");
            PageResponse::bad_gateway("Test email failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::router;
    use crate::routes::test_support::{body_text, get};
    use crate::services::mailer::MockMailer;
    use crate::state::test_support::{mock_mailer, test_config, test_state, test_state_with_config};

    fn config_with_recipient() -> crate::config::Config {
        let mut config = test_config();
        config.email.test_recipient = Some("ops@example.com".into());
        config
    }

    #[tokio::test]
    async fn unconfigured_recipient_is_reported() {
        let (state, _) = test_state(MockMailer::default());
        let app = router(state.clone());

        let res = get(&app, "/test-email", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(res).await, "EMAIL_TEST_RECIPIENT not configured");
        assert_eq!(mock_mailer(&state).sent_count(), 0);
    }

    #[tokio::test]
    async fn sends_sample_code_to_recipient() {
        let (state, _) = test_state_with_config(MockMailer::default(), config_with_recipient());
        let app = router(state.clone());

        let res = get(&app, "/test-email", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "Test email sent!");

        let sent = mock_mailer(&state).sent_emails.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ops@example.com");
        assert!(sent[0].body.contains("123456"));
    }

    #[tokio::test]
    async fn failed_send_is_reported() {
        let (state, _) = test_state_with_config(MockMailer::failing(), config_with_recipient());
        let app = router(state);

        let res = get(&app, "/test-email", None).await;
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(res).await, "Test email failed");
    }
}
