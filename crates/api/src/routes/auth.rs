//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register    -> register
/// POST /login       -> login
/// POST /renew       -> renew
/// POST /logout      -> logout
/// POST /logout-all  -> logout_all (requires auth)
/// POST /verify-email -> verify_email
/// GET  /me          -> me (requires auth)
/// GET  /sessions    -> list_sessions (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/renew", post(auth::renew))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/verify-email", post(auth::verify_email))
        .route("/me", get(auth::me))
        .route("/sessions", get(auth::list_sessions))
}
