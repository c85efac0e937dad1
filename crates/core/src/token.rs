//! Token Codec: compact HS256 bearer tokens carrying an identity claim set.
//!
//! Access and refresh tokens come out of the same signing routine. The
//! [`TokenKind`] is embedded in the signed payload so a refresh token can
//! never be presented where an access token is expected, and vice versa.
//!
//! The codec is pure: it holds only the immutable signing key and performs
//! no I/O. Persisting refresh sessions is the store's job.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::Timestamp;

/// Minimum signing key length in bytes (HS256 block-size security floor).
pub const MIN_SECRET_LEN: usize = 32;

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_DURATION_MINS: i64 = 15;
/// Default refresh token lifetime in hours.
const DEFAULT_REFRESH_DURATION_HOURS: i64 = 24;
/// Longest lifetime [`TokenConfig`] accepts for either token kind.
pub const MAX_TOKEN_DURATION_DAYS: i64 = 366;

/// Discriminates the two token families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Verification failures. None of these are retryable with the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Structurally invalid, or the signature does not verify.
    #[error("Token is malformed or its signature is invalid")]
    Malformed,

    /// Signature is valid but the token is past its expiry.
    #[error("Token has expired")]
    Expired,

    /// Signature and expiry are valid but the token is of the wrong family.
    #[error("Expected a {expected} token but received a {found} token")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

/// Claims signed into every token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Random token id. For refresh tokens this is also the session id.
    #[serde(rename = "jti")]
    pub id: Uuid,
    /// Username of the identity the token was issued to.
    #[serde(rename = "sub")]
    pub subject: String,
    pub role: Role,
    /// Issued-at (UTC Unix seconds).
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry (UTC Unix seconds). The token is invalid from this instant on.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    pub kind: TokenKind,
}

impl TokenClaims {
    pub fn expires_at_utc(&self) -> Timestamp {
        DateTime::<Utc>::from_timestamp(self.expires_at, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Signs and verifies tokens with a single symmetric key.
///
/// Every service that trusts keyward tokens must be built with the same key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from a raw symmetric key.
    ///
    /// Keys shorter than [`MIN_SECRET_LEN`] bytes are a configuration error.
    pub fn new(secret: &[u8]) -> Result<Self, CoreError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CoreError::Configuration(format!(
                "Token signing key must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        // Expiry is checked by hand so that an expired token is only reported
        // as such once its signature has been verified.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Mint a token for `subject` valid for `ttl` from now.
    ///
    /// A non-positive `ttl` yields a token that is already expired; lifetimes
    /// used in production are checked to be positive by [`TokenConfig`].
    pub fn sign(
        &self,
        subject: &str,
        role: Role,
        ttl: Duration,
        kind: TokenKind,
    ) -> Result<(String, TokenClaims), CoreError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            CoreError::Internal(format!("Token lifetime {ttl} overflows the clock"))
        })?;
        let claims = TokenClaims {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            role,
            issued_at: now.timestamp(),
            expires_at: expires_at.timestamp(),
            kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CoreError::Internal(format!("Token signing failed: {e}")))?;

        Ok((token, claims))
    }

    /// Verify signature, expiry and kind, in that order.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Malformed)?
            .claims;

        if Utc::now().timestamp() >= claims.expires_at {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.kind,
            });
        }

        Ok(claims)
    }
}

/// Signing key and token lifetimes shared by every service.
#[derive(Clone)]
pub struct TokenConfig {
    /// Symmetric key; at least [`MIN_SECRET_LEN`] bytes.
    pub secret: String,
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_token_duration", &self.access_token_duration)
            .field("refresh_token_duration", &self.refresh_token_duration)
            .finish()
    }
}

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                        | Required | Default |
    /// |--------------------------------|----------|---------|
    /// | `TOKEN_SYMMETRIC_KEY`          | **yes**  | --      |
    /// | `ACCESS_TOKEN_DURATION_MINS`   | no       | `15`    |
    /// | `REFRESH_TOKEN_DURATION_HOURS` | no       | `24`    |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load token configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("TOKEN_SYMMETRIC_KEY").ok_or_else(|| {
            CoreError::Configuration("TOKEN_SYMMETRIC_KEY must be set in the environment".into())
        })?;

        let access_mins = parse_or(
            &lookup,
            "ACCESS_TOKEN_DURATION_MINS",
            DEFAULT_ACCESS_DURATION_MINS,
        )?;
        let refresh_hours = parse_or(
            &lookup,
            "REFRESH_TOKEN_DURATION_HOURS",
            DEFAULT_REFRESH_DURATION_HOURS,
        )?;

        let config = Self {
            secret,
            access_token_duration: Duration::try_minutes(access_mins)
                .ok_or_else(|| out_of_range("ACCESS_TOKEN_DURATION_MINS"))?,
            refresh_token_duration: Duration::try_hours(refresh_hours)
                .ok_or_else(|| out_of_range("REFRESH_TOKEN_DURATION_HOURS"))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject weak keys and non-positive lifetimes.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(CoreError::Configuration(format!(
                "TOKEN_SYMMETRIC_KEY must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.access_token_duration <= Duration::zero() {
            return Err(CoreError::Configuration(
                "Access token duration must be positive".into(),
            ));
        }
        if self.refresh_token_duration <= Duration::zero() {
            return Err(CoreError::Configuration(
                "Refresh token duration must be positive".into(),
            ));
        }
        let max = Duration::days(MAX_TOKEN_DURATION_DAYS);
        if self.access_token_duration > max || self.refresh_token_duration > max {
            return Err(CoreError::Configuration(format!(
                "Token durations must not exceed {MAX_TOKEN_DURATION_DAYS} days"
            )));
        }
        Ok(())
    }

    /// Build the codec for this configuration.
    pub fn codec(&self) -> Result<TokenCodec, CoreError> {
        self.validate()?;
        TokenCodec::new(self.secret.as_bytes())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Configuration(format!("{key} must be a valid integer"))),
        None => Ok(default),
    }
}

fn out_of_range(key: &str) -> CoreError {
    CoreError::Configuration(format!("{key} is out of range"))
}
