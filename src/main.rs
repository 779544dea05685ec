use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use otp_verify::{
    config::Config,
    routes::router,
    services::{
        mailer::Mailer, pluggable_mailer::PluggableMailer, verification::VerificationService,
    },
    session::{InMemorySessionStore, SessionStore},
    utils::session_token::SessionKeys,
    AppState,
};
use reqwest::Client;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing();

    let session_keys = match config.session_secret.as_deref() {
        Some(secret) => SessionKeys::from_secret(secret).context("invalid SESSION_SECRET")?,
        None => {
            warn!("SESSION_SECRET not set; using a random key, sessions end on restart");
            SessionKeys::generate()
        }
    };

    let http_client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let mailer = PluggableMailer::from_settings(&config.email, config.otp_debug_mode, &http_client);
    info!(provider = mailer.provider_name(), "Mailer initialised");
    let mailer: Arc<dyn Mailer> = Arc::new(mailer);

    let store = Arc::new(InMemorySessionStore::new());
    if let Some(max_idle) = config.session_idle {
        let store = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                store.purge_idle(max_idle, OffsetDateTime::now_utc());
            }
        });
    }

    let bind_addr = config.bind_addr;
    let state = AppState {
        verification: Arc::new(VerificationService::new(
            store as Arc<dyn SessionStore>,
            mailer.clone(),
        )),
        mailer,
        session_keys: Arc::new(session_keys),
        config: Arc::new(config),
    };

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Starting OTP email verification server on http://{}", bind_addr);
    if state.config.otp_debug_mode {
        info!("DEBUG MODE: ON - OTPs are written to the log");
    }

    axum::serve(listener, router(state))
        .await
        .context("server error")?;

    Ok(())
}
