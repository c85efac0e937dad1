use std::sync::Arc;

use keyward_core::error::CoreError;
use keyward_core::gate::AuthorizationGate;
use keyward_db::AuthStore;

use crate::auth::IdentityAuthority;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Identity and session persistence.
    pub store: Arc<dyn AuthStore>,
    /// Register, login and renewal orchestration.
    pub authority: Arc<IdentityAuthority>,
    /// Access-token check applied to protected routes.
    pub gate: AuthorizationGate,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the authority and gate around one shared token codec.
    ///
    /// Fails if the configured signing key is unusable.
    pub fn new(config: ServerConfig, store: Arc<dyn AuthStore>) -> Result<Self, CoreError> {
        let codec = Arc::new(config.token.codec()?);
        let authority = IdentityAuthority::new(Arc::clone(&store), Arc::clone(&codec), &config.token);

        Ok(Self {
            store,
            authority: Arc::new(authority),
            gate: AuthorizationGate::new(codec),
            config: Arc::new(config),
        })
    }
}
