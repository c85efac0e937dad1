//! Identity Authority: register, login and session renewal.
//!
//! Each attempt moves through credential checking, token minting and session
//! persistence. Nothing becomes visible until the final store write commits:
//! Register writes the identity and its first session in one atomic store
//! call, and Login writes a single session row.
//!
//! Email ownership is proven separately: an issued one-time code is redeemed
//! against the store, which consumes it and marks the identity verified in
//! one step.

use std::sync::Arc;

use chrono::{Duration, Utc};
use keyward_core::error::CoreError;
use keyward_core::password::{
    hash_password, validate_password_strength, verify_password, DUMMY_PASSWORD_HASH,
    MIN_PASSWORD_LENGTH,
};
use keyward_core::roles::Role;
use keyward_core::token::{TokenClaims, TokenCodec, TokenConfig, TokenKind};
use keyward_core::types::SessionId;
use keyward_core::validation::{validate_email, validate_username};
use keyward_core::verification::{codes_match, generate_secret_code, verification_ttl};
use keyward_db::models::email_verification::{CreateEmailVerification, EmailVerification};
use keyward_db::models::identity::{CreateIdentity, Identity};
use keyward_db::models::session::{CreateSession, Session};
use keyward_db::AuthStore;
use uuid::Uuid;

use super::client::ClientMetadata;

/// Message for every failed code redemption, whatever the cause.
const INVALID_VERIFICATION: &str = "Verification code is invalid or expired";

/// Input for [`IdentityAuthority::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub password: String,
}

/// A freshly authenticated identity with its access/refresh token pair.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub identity: Identity,
    pub access_token: String,
    pub access_claims: TokenClaims,
    pub refresh_token: String,
    /// `refresh_claims.id` is the persisted session id.
    pub refresh_claims: TokenClaims,
}

/// A new access token minted from an existing session.
#[derive(Debug, Clone)]
pub struct RenewedAccess {
    pub access_token: String,
    pub access_claims: TokenClaims,
}

/// Tokens minted for one attempt, before anything is persisted.
struct MintedPair {
    access_token: String,
    access_claims: TokenClaims,
    refresh_token: String,
    refresh_claims: TokenClaims,
}

/// Orchestrates password checks, token minting and the session ledger.
pub struct IdentityAuthority {
    store: Arc<dyn AuthStore>,
    codec: Arc<TokenCodec>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl IdentityAuthority {
    pub fn new(store: Arc<dyn AuthStore>, codec: Arc<TokenCodec>, config: &TokenConfig) -> Self {
        Self {
            store,
            codec,
            access_token_duration: config.access_token_duration,
            refresh_token_duration: config.refresh_token_duration,
        }
    }

    /// Create a new identity with role `user` and open its first session.
    pub async fn register(
        &self,
        input: Registration,
        client: ClientMetadata,
    ) -> Result<IssuedSession, CoreError> {
        validate_registration(&input)?;
        self.ensure_login_names_free(&input).await?;

        let password_hash = hash_password(&input.password)?;
        let role = Role::User;
        let tokens = self.mint_pair(&input.username, role)?;

        let new_identity = CreateIdentity {
            username: input.username,
            full_name: input.full_name.trim().to_string(),
            email: input.email,
            phone_number: input.phone_number,
            password_hash,
            role,
        };
        let new_session = self.session_row(&new_identity.username, &tokens, client);

        let (identity, session) = self.store.register(&new_identity, &new_session).await?;

        tracing::info!(
            username = %identity.username,
            session_id = %session.id,
            "Identity registered"
        );

        Ok(tokens.into_issued(identity))
    }

    /// Authenticate by username or email and open an additional session.
    ///
    /// Unknown identities and wrong passwords produce the same error.
    /// Earlier sessions of the identity are left untouched.
    pub async fn login(
        &self,
        login: &str,
        password: &str,
        client: ClientMetadata,
    ) -> Result<IssuedSession, CoreError> {
        let Some(identity) = self.store.find_identity_by_login(login).await? else {
            // Spend the same Argon2 work a real mismatch would.
            let _ = verify_password(password, DUMMY_PASSWORD_HASH);
            tracing::info!("Login rejected: unknown identity");
            return Err(CoreError::AuthenticationFailed);
        };

        if !verify_password(password, &identity.password_hash) {
            tracing::info!(username = %identity.username, "Login rejected: password mismatch");
            return Err(CoreError::AuthenticationFailed);
        }

        let tokens = self.mint_pair(&identity.username, identity.role()?)?;
        let new_session = self.session_row(&identity.username, &tokens, client);
        let session = self.store.create_session(&new_session).await?;

        tracing::info!(
            username = %identity.username,
            session_id = %session.id,
            "Session opened"
        );

        Ok(tokens.into_issued(identity))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated. The new access token carries
    /// the identity's current role, not the role in the refresh claims.
    pub async fn renew_session(&self, refresh_token: &str) -> Result<RenewedAccess, CoreError> {
        let claims = self.codec.verify(refresh_token, TokenKind::Refresh)?;
        let session = self.renewable_session(&claims, refresh_token).await?;

        let Some(identity) = self.store.find_identity(&session.username).await? else {
            tracing::warn!(session_id = %session.id, "Session owner no longer exists");
            return Err(CoreError::SessionInvalid);
        };

        let (access_token, access_claims) = self.codec.sign(
            &session.username,
            identity.role()?,
            self.access_token_duration,
            TokenKind::Access,
        )?;

        tracing::debug!(session_id = %session.id, "Access token renewed");

        Ok(RenewedAccess {
            access_token,
            access_claims,
        })
    }

    /// Block the session behind a refresh token.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), CoreError> {
        let claims = self.codec.verify(refresh_token, TokenKind::Refresh)?;
        let session = self
            .store
            .find_session(claims.id)
            .await?
            .filter(|s| s.refresh_token == refresh_token)
            .ok_or(CoreError::SessionInvalid)?;

        self.store.set_session_blocked(session.id, true).await?;
        tracing::info!(username = %session.username, session_id = %session.id, "Session closed");
        Ok(())
    }

    /// Block every open session of `username`. Returns how many were blocked.
    pub async fn logout_all(&self, username: &str) -> Result<u64, CoreError> {
        let blocked = self.store.block_sessions_for(username).await?;
        tracing::info!(username, blocked, "All sessions closed");
        Ok(blocked)
    }

    /// Revoke one session by id.
    pub async fn block_session(&self, id: SessionId) -> Result<(), CoreError> {
        self.set_blocked(id, true).await
    }

    /// Lift a previous block on one session.
    pub async fn unblock_session(&self, id: SessionId) -> Result<(), CoreError> {
        self.set_blocked(id, false).await
    }

    pub async fn list_sessions(&self, username: &str) -> Result<Vec<Session>, CoreError> {
        Ok(self.store.list_sessions_for(username).await?)
    }

    pub async fn identity(&self, username: &str) -> Result<Identity, CoreError> {
        self.store
            .find_identity(username)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "identity",
                id: username.to_string(),
            })
    }

    /// Issue a one-time code for the identity's current email address.
    ///
    /// The caller delivers `secret_code` to the address out of band.
    pub async fn issue_email_verification(
        &self,
        username: &str,
    ) -> Result<EmailVerification, CoreError> {
        let identity = self.identity(username).await?;
        let Some(email) = identity.email else {
            return Err(CoreError::Validation(format!(
                "Identity '{username}' has no email address"
            )));
        };
        if identity.is_verified {
            return Err(CoreError::Conflict("Email is already verified".into()));
        }

        let input = CreateEmailVerification {
            id: Uuid::new_v4(),
            username: identity.username,
            email,
            secret_code: generate_secret_code(),
            expires_at: Utc::now() + verification_ttl(),
        };
        let verification = self.store.create_email_verification(&input).await?;

        tracing::info!(
            username = %verification.username,
            verification_id = %verification.id,
            "Email verification issued"
        );
        Ok(verification)
    }

    /// Redeem a verification code, marking its identity verified.
    ///
    /// Unknown, mismatched, used and expired codes all fail the same way.
    pub async fn verify_email(&self, id: Uuid, secret_code: &str) -> Result<Identity, CoreError> {
        let Some(verification) = self.store.find_email_verification(id).await? else {
            tracing::info!(verification_id = %id, "Verification rejected: unknown code");
            return Err(CoreError::Validation(INVALID_VERIFICATION.into()));
        };
        if !codes_match(&verification.secret_code, secret_code) {
            tracing::warn!(verification_id = %id, "Verification rejected: code mismatch");
            return Err(CoreError::Validation(INVALID_VERIFICATION.into()));
        }
        if !verification.is_redeemable_at(Utc::now()) {
            tracing::info!(verification_id = %id, "Verification rejected: used or expired");
            return Err(CoreError::Validation(INVALID_VERIFICATION.into()));
        }

        let Some(identity) = self.store.complete_email_verification(id).await? else {
            tracing::info!(verification_id = %id, "Verification lost a race or went stale");
            return Err(CoreError::Validation(INVALID_VERIFICATION.into()));
        };

        tracing::info!(username = %identity.username, "Email verified");
        Ok(identity)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Login resolves one string against usernames and emails alike, so a new
    /// username must not equal any stored email and a new email must not
    /// equal any stored username.
    async fn ensure_login_names_free(&self, input: &Registration) -> Result<(), CoreError> {
        let mut names = vec![input.username.as_str()];
        names.extend(input.email.as_deref());
        for name in names {
            if self.store.find_identity_by_login(name).await?.is_some() {
                tracing::info!(username = %input.username, "Registration collides with a login name");
                return Err(CoreError::Conflict(
                    "Username or email is already registered".into(),
                ));
            }
        }
        Ok(())
    }

    fn mint_pair(&self, username: &str, role: Role) -> Result<MintedPair, CoreError> {
        let (access_token, access_claims) =
            self.codec
                .sign(username, role, self.access_token_duration, TokenKind::Access)?;
        let (refresh_token, refresh_claims) =
            self.codec
                .sign(username, role, self.refresh_token_duration, TokenKind::Refresh)?;

        Ok(MintedPair {
            access_token,
            access_claims,
            refresh_token,
            refresh_claims,
        })
    }

    fn session_row(
        &self,
        username: &str,
        tokens: &MintedPair,
        client: ClientMetadata,
    ) -> CreateSession {
        CreateSession {
            id: tokens.refresh_claims.id,
            username: username.to_string(),
            refresh_token: tokens.refresh_token.clone(),
            user_agent: client.user_agent,
            client_ip: client.client_ip,
            expires_at: tokens.refresh_claims.expires_at_utc(),
        }
    }

    /// Load the session behind verified refresh claims and check it can renew.
    async fn renewable_session(
        &self,
        claims: &TokenClaims,
        refresh_token: &str,
    ) -> Result<Session, CoreError> {
        let Some(session) = self.store.find_session(claims.id).await? else {
            tracing::warn!(session_id = %claims.id, "Renewal for unknown session");
            return Err(CoreError::SessionInvalid);
        };

        if session.is_blocked {
            tracing::warn!(session_id = %session.id, "Renewal for blocked session");
            return Err(CoreError::SessionInvalid);
        }
        if !session.is_renewable_at(Utc::now()) {
            tracing::info!(session_id = %session.id, "Renewal for expired session");
            return Err(CoreError::SessionInvalid);
        }
        if session.username != claims.subject || session.refresh_token != refresh_token {
            tracing::warn!(session_id = %session.id, "Refresh token does not match its session");
            return Err(CoreError::SessionInvalid);
        }

        Ok(session)
    }

    async fn set_blocked(&self, id: SessionId, blocked: bool) -> Result<(), CoreError> {
        if !self.store.set_session_blocked(id, blocked).await? {
            return Err(CoreError::NotFound {
                entity: "session",
                id: id.to_string(),
            });
        }
        tracing::info!(session_id = %id, blocked, "Session block flag changed");
        Ok(())
    }
}

impl MintedPair {
    fn into_issued(self, identity: Identity) -> IssuedSession {
        IssuedSession {
            identity,
            access_token: self.access_token,
            access_claims: self.access_claims,
            refresh_token: self.refresh_token,
            refresh_claims: self.refresh_claims,
        }
    }
}

fn validate_registration(input: &Registration) -> Result<(), CoreError> {
    validate_username(&input.username)?;
    if input.full_name.trim().is_empty() {
        return Err(CoreError::Validation("Full name must not be empty".into()));
    }
    if let Some(email) = &input.email {
        validate_email(email)?;
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
}
