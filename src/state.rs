use crate::auth::{Authenticator, SharedSecretAuthenticator};
use crate::config::Config;
use crate::store::KvStore;
use std::sync::Arc;

/// Shared application state
///
/// Immutable after startup; cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the store with a shared-secret authenticator built from `config`.
    pub fn new(config: Config, store: Arc<dyn KvStore>) -> Self {
        let authenticator = Arc::new(SharedSecretAuthenticator::new(config.auth_password.clone()));
        Self {
            store,
            authenticator,
            config: Arc::new(config),
        }
    }
}
