//! Access-token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use keyward_core::error::CoreError;
use keyward_core::roles::Role;
use keyward_core::token::TokenClaims;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, admitted by the authorization gate.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(username = %user.username, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
    /// The full verified access claims.
    pub claims: TokenClaims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = state
            .gate
            .authenticate(&parts.headers)
            .map_err(|rejection| AppError::Core(CoreError::Rejected(rejection)))?;

        Ok(AuthUser {
            username: claims.subject.clone(),
            role: claims.role,
            claims,
        })
    }
}
