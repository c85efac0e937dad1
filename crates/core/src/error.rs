use crate::gate::GateRejection;
use crate::token::TokenError;

/// Domain errors raised by the trust core.
///
/// Every variant is terminal: the core never retries internally, and callers
/// must obtain fresh credentials or fix their input before trying again.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Fatal startup misconfiguration (e.g. a signing key that is too short).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown identity or wrong password. Deliberately carries no detail.
    #[error("Invalid username or password")]
    AuthenticationFailed,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Renewal rejected: the session is missing, blocked, or expired.
    #[error("Session is invalid or has been revoked")]
    SessionInvalid,

    #[error(transparent)]
    Rejected(#[from] GateRejection),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An operation the backing implementation does not provide.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}
