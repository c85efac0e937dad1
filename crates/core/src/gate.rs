//! Authorization Gate: the only code permitted to parse inbound credentials.
//!
//! Every downstream service calls [`AuthorizationGate::authenticate`] once per
//! call, then applies its own role policy to the returned claims.

use std::collections::HashMap;
use std::sync::Arc;

use crate::token::{TokenClaims, TokenCodec, TokenError, TokenKind};

/// Metadata key carrying the bearer credential (lowercase, as on the wire).
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Accepted authorization scheme, compared case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Why an inbound call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateRejection {
    #[error("Missing authorization metadata")]
    MissingCredentials,

    #[error("Multiple authorization values supplied")]
    AmbiguousCredentials,

    #[error("Invalid authorization format. Expected: Bearer <token>")]
    InvalidFormat,

    #[error("Unsupported authorization scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] TokenError),
}

/// Call-scoped metadata an RPC or HTTP transport hands to the gate.
///
/// Keys are looked up in lowercase.
pub trait CallMetadata {
    /// Every value recorded under `key`, in arrival order.
    fn values(&self, key: &str) -> Vec<&str>;
}

impl CallMetadata for http::HeaderMap {
    fn values(&self, key: &str) -> Vec<&str> {
        // A non-ASCII header value is kept as an empty entry so it is
        // rejected as a format error rather than silently skipped.
        self.get_all(key)
            .iter()
            .map(|v| v.to_str().unwrap_or_default())
            .collect()
    }
}

impl CallMetadata for HashMap<String, String> {
    fn values(&self, key: &str) -> Vec<&str> {
        self.get(key).map(String::as_str).into_iter().collect()
    }
}

impl CallMetadata for HashMap<String, Vec<String>> {
    fn values(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|vs| vs.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Split `Bearer <token>` into its token, rejecting any other shape.
pub fn extract_bearer(header: &str) -> Result<&str, GateRejection> {
    let mut fields = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(GateRejection::InvalidFormat);
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(GateRejection::UnsupportedScheme(scheme.to_ascii_lowercase()));
    }

    Ok(token)
}

/// Verifies access tokens presented on inbound calls.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    codec: Arc<TokenCodec>,
}

impl AuthorizationGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Authenticate a call from its metadata, returning the access claims.
    pub fn authenticate<M>(&self, metadata: &M) -> Result<TokenClaims, GateRejection>
    where
        M: CallMetadata + ?Sized,
    {
        let values = metadata.values(AUTHORIZATION_KEY);
        let header = match values.as_slice() {
            [] => return Err(GateRejection::MissingCredentials),
            [single] => *single,
            _ => return Err(GateRejection::AmbiguousCredentials),
        };

        let token = extract_bearer(header)?;
        let claims = self.codec.verify(token, TokenKind::Access).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            GateRejection::InvalidToken(e)
        })?;

        Ok(claims)
    }
}
