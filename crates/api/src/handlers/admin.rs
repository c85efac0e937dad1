//! Handlers for the `/admin` resource (session moderation and email
//! verification issuance).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keyward_core::types::{SessionId, Timestamp};
use keyward_db::models::email_verification::EmailVerification;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A freshly issued verification code, handed to the mail relay.
#[derive(Debug, Serialize)]
pub struct IssuedVerificationResponse {
    pub verification_id: Uuid,
    pub username: String,
    pub email: String,
    pub secret_code: String,
    pub expires_at: Timestamp,
}

impl From<EmailVerification> for IssuedVerificationResponse {
    fn from(v: EmailVerification) -> Self {
        Self {
            verification_id: v.id,
            username: v.username,
            email: v.email,
            secret_code: v.secret_code,
            expires_at: v.expires_at,
        }
    }
}

/// POST /api/v1/admin/sessions/{id}/block
///
/// Renewal through this session fails until it is unblocked.
pub async fn block_session(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<SessionId>,
) -> AppResult<StatusCode> {
    state.authority.block_session(id).await?;
    tracing::info!(admin = %admin.username, session_id = %id, "Session blocked by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/sessions/{id}/unblock
pub async fn unblock_session(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<SessionId>,
) -> AppResult<StatusCode> {
    state.authority.unblock_session(id).await?;
    tracing::info!(admin = %admin.username, session_id = %id, "Session unblocked by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/identities/{username}/email-verifications
///
/// Issue a one-time code for the identity's email. Delivery is the caller's
/// job. Returns 201 Created.
pub async fn issue_email_verification(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<IssuedVerificationResponse>>)> {
    let verification = state.authority.issue_email_verification(&username).await?;
    tracing::info!(admin = %admin.username, username = %username, "Email verification requested by admin");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: verification.into(),
        }),
    ))
}
