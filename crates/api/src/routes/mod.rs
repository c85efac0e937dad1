pub mod admin;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/renew                          renew access token (public)
/// /auth/logout                         close one session (public)
/// /auth/logout-all                     close every session (requires auth)
/// /auth/me                             current identity (requires auth)
/// /auth/sessions                       current identity's sessions (requires auth)
///
/// /admin/sessions/{id}/block           block a session (admin only)
/// /admin/sessions/{id}/unblock         unblock a session (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
