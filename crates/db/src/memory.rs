//! In-process [`AuthStore`] used by tests and database-less local runs.
//!
//! All tables sit behind one async mutex, so every operation (including the
//! two-row register) is observed atomically by other callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use keyward_core::types::SessionId;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::email_verification::{CreateEmailVerification, EmailVerification};
use crate::models::identity::{CreateIdentity, Identity};
use crate::models::session::{CreateSession, Session};
use crate::store::AuthStore;

#[derive(Debug, Default)]
struct Tables {
    identities: HashMap<String, Identity>,
    sessions: HashMap<SessionId, Session>,
    email_verifications: HashMap<Uuid, EmailVerification>,
}

impl Tables {
    fn insert_identity(&mut self, input: &CreateIdentity) -> Result<Identity, StoreError> {
        if self.identities.contains_key(&input.username) {
            return Err(StoreError::Duplicate {
                entity: "identity",
                detail: "identities_pkey".into(),
            });
        }
        if let Some(email) = &input.email {
            if self
                .identities
                .values()
                .any(|i| i.email.as_deref() == Some(email.as_str()))
            {
                return Err(StoreError::Duplicate {
                    entity: "identity",
                    detail: "uq_identities_email".into(),
                });
            }
        }

        let now = Utc::now();
        let identity = Identity {
            username: input.username.clone(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            phone_number: input.phone_number.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.as_str().to_string(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        self.identities
            .insert(identity.username.clone(), identity.clone());
        Ok(identity)
    }

    fn insert_session(&mut self, input: &CreateSession) -> Result<Session, StoreError> {
        if self.sessions.contains_key(&input.id) {
            return Err(StoreError::Duplicate {
                entity: "session",
                detail: "sessions_pkey".into(),
            });
        }
        if !self.identities.contains_key(&input.username) {
            return Err(StoreError::Integrity(format!(
                "session references unknown identity '{}'",
                input.username
            )));
        }

        let session = Session {
            id: input.id,
            username: input.username.clone(),
            refresh_token: input.refresh_token.clone(),
            user_agent: input.user_agent.clone(),
            client_ip: input.client_ip.clone(),
            is_blocked: false,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    fn insert_email_verification(
        &mut self,
        input: &CreateEmailVerification,
    ) -> Result<EmailVerification, StoreError> {
        if self.email_verifications.contains_key(&input.id) {
            return Err(StoreError::Duplicate {
                entity: "email_verification",
                detail: "email_verifications_pkey".into(),
            });
        }
        if !self.identities.contains_key(&input.username) {
            return Err(StoreError::Integrity(format!(
                "email verification references unknown identity '{}'",
                input.username
            )));
        }

        let verification = EmailVerification {
            id: input.id,
            username: input.username.clone(),
            email: input.email.clone(),
            secret_code: input.secret_code.clone(),
            is_used: false,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        self.email_verifications
            .insert(verification.id, verification.clone());
        Ok(verification)
    }
}

/// [`AuthStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    tables: Mutex<Tables>,
    fail_session_writes: AtomicBool,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent session write fail with [`StoreError::Unavailable`].
    pub fn fail_session_writes(&self, fail: bool) {
        self.fail_session_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of identities currently stored.
    pub async fn identity_count(&self) -> usize {
        self.tables.lock().await.identities.len()
    }

    /// Number of sessions currently stored, blocked or not.
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    fn check_session_write(&self) -> Result<(), StoreError> {
        if self.fail_session_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("session write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn register(
        &self,
        identity: &CreateIdentity,
        session: &CreateSession,
    ) -> Result<(Identity, Session), StoreError> {
        let mut tables = self.tables.lock().await;
        let created = tables.insert_identity(identity)?;

        let session = self
            .check_session_write()
            .and_then(|()| tables.insert_session(session));

        match session {
            Ok(session) => Ok((created, session)),
            Err(e) => {
                // Roll back the identity before the lock is released.
                tables.identities.remove(&created.username);
                Err(e)
            }
        }
    }

    async fn find_identity(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.tables.lock().await.identities.get(username).cloned())
    }

    async fn find_identity_by_login(&self, login: &str) -> Result<Option<Identity>, StoreError> {
        let tables = self.tables.lock().await;
        if let Some(identity) = tables.identities.get(login) {
            return Ok(Some(identity.clone()));
        }
        Ok(tables
            .identities
            .values()
            .find(|i| i.email.as_deref() == Some(login))
            .cloned())
    }

    async fn create_session(&self, session: &CreateSession) -> Result<Session, StoreError> {
        self.check_session_write()?;
        self.tables.lock().await.insert_session(session)
    }

    async fn find_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn set_session_blocked(&self, id: SessionId, blocked: bool) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.sessions.get_mut(&id) {
            Some(session) => {
                session.is_blocked = blocked;
                true
            }
            None => false,
        })
    }

    async fn block_sessions_for(&self, username: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let mut blocked = 0;
        for session in tables
            .sessions
            .values_mut()
            .filter(|s| s.username == username && !s.is_blocked)
        {
            session.is_blocked = true;
            blocked += 1;
        }
        Ok(blocked)
    }

    async fn list_sessions_for(&self, username: &str) -> Result<Vec<Session>, StoreError> {
        let tables = self.tables.lock().await;
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.username == username)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create_email_verification(
        &self,
        verification: &CreateEmailVerification,
    ) -> Result<EmailVerification, StoreError> {
        self.tables
            .lock()
            .await
            .insert_email_verification(verification)
    }

    async fn find_email_verification(
        &self,
        id: Uuid,
    ) -> Result<Option<EmailVerification>, StoreError> {
        Ok(self.tables.lock().await.email_verifications.get(&id).cloned())
    }

    async fn complete_email_verification(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Tables {
            identities,
            email_verifications,
            ..
        } = &mut *tables;

        let Some(verification) = email_verifications
            .get_mut(&id)
            .filter(|v| v.is_redeemable_at(Utc::now()))
        else {
            return Ok(None);
        };
        let Some(identity) = identities
            .get_mut(&verification.username)
            .filter(|i| i.email.as_deref() == Some(verification.email.as_str()))
        else {
            return Ok(None);
        };

        verification.is_used = true;
        identity.is_verified = true;
        identity.updated_at = Utc::now();
        Ok(Some(identity.clone()))
    }
}
