//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use keyward_core::types::{SessionId, Timestamp};
use keyward_db::models::identity::IdentityResponse;
use keyward_db::models::session::SessionResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{ClientMetadata, IssuedSession, Registration};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

/// Request body for `POST /auth/renew` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub verification_id: Uuid,
    pub secret_code: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub identity: IdentityResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: Timestamp,
    pub refresh_token_expires_at: Timestamp,
    pub session_id: SessionId,
}

impl From<IssuedSession> for AuthResponse {
    fn from(issued: IssuedSession) -> Self {
        Self {
            identity: issued.identity.into(),
            access_token_expires_at: issued.access_claims.expires_at_utc(),
            refresh_token_expires_at: issued.refresh_claims.expires_at_utc(),
            session_id: issued.refresh_claims.id,
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub access_token: String,
    pub access_token_expires_at: Timestamp,
    /// The presented refresh token. It is not rotated.
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    pub blocked: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an identity and its first session. Returns 201 Created.
pub async fn register(
    State(state): State<AppState>,
    client: ClientMetadata,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let registration = Registration {
        username: input.username,
        full_name: input.full_name,
        phone_number: input.phone_number,
        email: input.email,
        password: input.password,
    };
    let issued = state.authority.register(registration, client).await?;
    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username or email plus password.
pub async fn login(
    State(state): State<AppState>,
    client: ClientMetadata,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let issued = state
        .authority
        .login(&input.login, &input.password, client)
        .await?;
    Ok(Json(issued.into()))
}

/// POST /api/v1/auth/renew
///
/// Exchange a refresh token for a new access token.
pub async fn renew(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<RenewResponse>> {
    let renewed = state.authority.renew_session(&input.refresh_token).await?;
    Ok(Json(RenewResponse {
        access_token_expires_at: renewed.access_claims.expires_at_utc(),
        access_token: renewed.access_token,
        refresh_token: input.refresh_token,
    }))
}

/// POST /api/v1/auth/logout
///
/// Block the session behind the given refresh token. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<StatusCode> {
    state.authority.logout(&input.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/verify-email
///
/// Redeem a one-time code. Returns the now verified identity.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<DataResponse<IdentityResponse>>> {
    let identity = state
        .authority
        .verify_email(input.verification_id, &input.secret_code)
        .await?;
    Ok(Json(DataResponse {
        data: identity.into(),
    }))
}

/// POST /api/v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<LogoutAllResponse>>> {
    let blocked = state.authority.logout_all(&user.username).await?;
    Ok(Json(DataResponse {
        data: LogoutAllResponse { blocked },
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<IdentityResponse>>> {
    let identity = state.authority.identity(&user.username).await?;
    Ok(Json(DataResponse {
        data: identity.into(),
    }))
}

/// GET /api/v1/auth/sessions
///
/// Newest first. Refresh tokens are never included.
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SessionResponse>>>> {
    let sessions = state.authority.list_sessions(&user.username).await?;
    Ok(Json(DataResponse {
        data: sessions.into_iter().map(SessionResponse::from).collect(),
    }))
}
