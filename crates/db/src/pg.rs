//! PostgreSQL-backed [`AuthStore`].

use async_trait::async_trait;
use keyward_core::types::SessionId;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::email_verification::{CreateEmailVerification, EmailVerification};
use crate::models::identity::{CreateIdentity, Identity};
use crate::models::session::{CreateSession, Session};
use crate::repositories::{EmailVerificationRepo, IdentityRepo, SessionRepo};
use crate::store::AuthStore;
use crate::DbPool;

/// [`AuthStore`] over a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: DbPool,
}

impl PgAuthStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn register(
        &self,
        identity: &CreateIdentity,
        session: &CreateSession,
    ) -> Result<(Identity, Session), StoreError> {
        // Dropping `tx` without commit rolls the identity insert back.
        let mut tx = self.pool.begin().await?;

        let identity = IdentityRepo::create(&mut *tx, identity)
            .await
            .map_err(|e| StoreError::classify(e, "identity"))?;
        let session = SessionRepo::create(&mut *tx, session)
            .await
            .map_err(|e| {
                tracing::warn!(username = %identity.username, error = %e, "Register rolled back");
                StoreError::classify(e, "session")
            })?;

        tx.commit().await?;
        Ok((identity, session))
    }

    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        Ok(IdentityRepo::find_by_username(&self.pool, username).await?)
    }

    async fn find_identity_by_login(&self, login: &str) -> Result<Option<Identity>, StoreError> {
        if let Some(identity) = IdentityRepo::find_by_username(&self.pool, login).await? {
            return Ok(Some(identity));
        }
        Ok(IdentityRepo::find_by_email(&self.pool, login).await?)
    }

    async fn create_session(&self, session: &CreateSession) -> Result<Session, StoreError> {
        SessionRepo::create(&self.pool, session)
            .await
            .map_err(|e| StoreError::classify(e, "session"))
    }

    async fn find_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(SessionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn set_session_blocked(&self, id: SessionId, blocked: bool) -> Result<bool, StoreError> {
        Ok(SessionRepo::set_blocked(&self.pool, id, blocked).await?)
    }

    async fn block_sessions_for(&self, username: &str) -> Result<u64, StoreError> {
        Ok(SessionRepo::block_all_for_username(&self.pool, username).await?)
    }

    async fn list_sessions_for(&self, username: &str) -> Result<Vec<Session>, StoreError> {
        Ok(SessionRepo::list_for_username(&self.pool, username).await?)
    }

    async fn create_email_verification(
        &self,
        verification: &CreateEmailVerification,
    ) -> Result<EmailVerification, StoreError> {
        EmailVerificationRepo::create(&self.pool, verification)
            .await
            .map_err(|e| StoreError::classify(e, "email_verification"))
    }

    async fn find_email_verification(
        &self,
        id: Uuid,
    ) -> Result<Option<EmailVerification>, StoreError> {
        Ok(EmailVerificationRepo::find_by_id(&self.pool, id).await?)
    }

    async fn complete_email_verification(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        // Dropping `tx` without commit leaves the code unused.
        let mut tx = self.pool.begin().await?;

        let Some(verification) = EmailVerificationRepo::mark_used(&mut *tx, id).await? else {
            return Ok(None);
        };
        let identity =
            IdentityRepo::mark_verified(&mut *tx, &verification.username, &verification.email)
                .await?;
        if identity.is_none() {
            tracing::warn!(
                username = %verification.username,
                verification_id = %id,
                "Verification address no longer matches identity"
            );
            return Ok(None);
        }

        tx.commit().await?;
        Ok(identity)
    }
}
