//! The storage seam beneath the identity authority.
//!
//! Implementations are injected as `Arc<dyn AuthStore>`; nothing reaches a
//! database handle through global state.

use async_trait::async_trait;
use keyward_core::types::SessionId;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::email_verification::{CreateEmailVerification, EmailVerification};
use crate::models::identity::{CreateIdentity, Identity};
use crate::models::session::{CreateSession, Session};

/// Identity store plus session ledger.
///
/// Session creation must tolerate any number of concurrent sessions for one
/// username. The revocation and email verification operations have default
/// bodies returning
/// [`StoreError::NotImplemented`] so a partial implementation degrades to an
/// error instead of a crash.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Create an identity and its first session as one atomic unit.
    ///
    /// Either both rows become visible or neither does.
    async fn register(
        &self,
        identity: &CreateIdentity,
        session: &CreateSession,
    ) -> Result<(Identity, Session), StoreError>;

    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Find an identity by username, falling back to email.
    async fn find_identity_by_login(&self, login: &str) -> Result<Option<Identity>, StoreError>;

    /// Persist a new session. Fails with [`StoreError::Duplicate`] on id reuse.
    async fn create_session(&self, session: &CreateSession) -> Result<Session, StoreError>;

    /// Point lookup by session id.
    async fn find_session(&self, id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Set or clear the blocked flag. Returns `false` if no such session.
    async fn set_session_blocked(&self, id: SessionId, blocked: bool) -> Result<bool, StoreError> {
        let _ = (id, blocked);
        Err(StoreError::NotImplemented("set_session_blocked"))
    }

    /// Block every open session of `username`, returning how many changed.
    async fn block_sessions_for(&self, username: &str) -> Result<u64, StoreError> {
        let _ = username;
        Err(StoreError::NotImplemented("block_sessions_for"))
    }

    /// List the sessions of `username`, newest first.
    async fn list_sessions_for(&self, username: &str) -> Result<Vec<Session>, StoreError> {
        let _ = username;
        Err(StoreError::NotImplemented("list_sessions_for"))
    }

    /// Persist a freshly issued verification code.
    async fn create_email_verification(
        &self,
        verification: &CreateEmailVerification,
    ) -> Result<EmailVerification, StoreError> {
        let _ = verification;
        Err(StoreError::NotImplemented("create_email_verification"))
    }

    async fn find_email_verification(
        &self,
        id: Uuid,
    ) -> Result<Option<EmailVerification>, StoreError> {
        let _ = id;
        Err(StoreError::NotImplemented("find_email_verification"))
    }

    /// Consume a redeemable code and mark its identity verified, atomically.
    ///
    /// Returns the updated identity, or `None` if the code was already used,
    /// has expired or no longer matches the identity's email. In the `None`
    /// case nothing is written.
    async fn complete_email_verification(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let _ = id;
        Err(StoreError::NotImplemented("complete_email_verification"))
    }
}
