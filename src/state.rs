use crate::config::Config;
use crate::services::mailer::Mailer;
use crate::services::verification::VerificationService;
use crate::utils::session_token::SessionKeys;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub verification: Arc<VerificationService>,
    pub mailer: Arc<dyn Mailer>,
    pub session_keys: Arc<SessionKeys>,
    pub config: Arc<Config>,
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::services::mailer::MockMailer;
    use crate::session::{InMemorySessionStore, SessionStore};

    pub const TEST_SESSION_SECRET: &str = "0123456789abcdef0123456789abcdef";

    pub fn test_config() -> Config {
        Config::from_lookup(|_| None).expect("defaults are valid")
    }

    /// State backed by an in-memory store and the given mock mailer.
    pub fn test_state(mailer: MockMailer) -> (AppState, Arc<InMemorySessionStore>) {
        test_state_with_config(mailer, test_config())
    }

    pub fn test_state_with_config(
        mailer: MockMailer,
        config: Config,
    ) -> (AppState, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let mailer: Arc<dyn Mailer> = Arc::new(mailer);
        let state = AppState {
            verification: Arc::new(VerificationService::new(
                store.clone() as Arc<dyn SessionStore>,
                mailer.clone(),
            )),
            mailer,
            session_keys: Arc::new(
                SessionKeys::from_secret(TEST_SESSION_SECRET).expect("test secret is valid"),
            ),
            config: Arc::new(config),
        };
        (state, store)
    }

    pub fn mock_mailer(state: &AppState) -> &MockMailer {
        state
            .mailer
            .as_any()
            .downcast_ref::<MockMailer>()
            .expect("test state uses MockMailer")
    }
}
