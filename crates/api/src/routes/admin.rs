//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// POST /sessions/{id}/block    -> block_session
/// POST /sessions/{id}/unblock  -> unblock_session
/// POST /identities/{username}/email-verifications -> issue_email_verification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}/block", post(admin::block_session))
        .route("/sessions/{id}/unblock", post(admin::unblock_session))
        .route(
            "/identities/{username}/email-verifications",
            post(admin::issue_email_verification),
        )
}
