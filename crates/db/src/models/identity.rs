//! Identity entity model and DTOs.

use keyward_core::error::CoreError;
use keyward_core::roles::Role;
use keyward_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Full identity row from the `identities` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`IdentityResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Identity {
    /// Parse the stored role name.
    pub fn role(&self) -> Result<Role, CoreError> {
        self.role.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Identity '{}' has unknown role '{}'",
                self.username, self.role
            ))
        })
    }
}

/// Safe identity representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            username: identity.username,
            full_name: identity.full_name,
            email: identity.email,
            phone_number: identity.phone_number,
            role: identity.role,
            is_verified: identity.is_verified,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// DTO for creating a new identity.
#[derive(Debug, Clone)]
pub struct CreateIdentity {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
}
