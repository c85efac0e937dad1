//! Session model and DTOs.

use keyward_core::types::{SessionId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A refresh-token session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Equal to the refresh token's `jti` claim.
    pub id: SessionId,
    pub username: String,
    pub refresh_token: String,
    /// Empty when the client did not send one.
    pub user_agent: String,
    /// Empty when the client address is unknown.
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// A session may back a renewal iff it is unblocked and unexpired.
    pub fn is_renewable_at(&self, now: Timestamp) -> bool {
        !self.is_blocked && now < self.expires_at
    }
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: SessionId,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub expires_at: Timestamp,
}

/// Session listing entry. The raw refresh token is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            user_agent: session.user_agent,
            client_ip: session.client_ip,
            is_blocked: session.is_blocked,
            expires_at: session.expires_at,
            created_at: session.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn session(is_blocked: bool, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            username: "alice".into(),
            refresh_token: "token".into(),
            user_agent: String::new(),
            client_ip: String::new(),
            is_blocked,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn test_renewable_when_open_and_unexpired() {
        assert!(session(false, Duration::hours(24)).is_renewable_at(Utc::now()));
    }

    #[test]
    fn test_blocked_or_expired_is_not_renewable() {
        let now = Utc::now();
        assert!(!session(true, Duration::hours(24)).is_renewable_at(now));
        assert!(!session(false, Duration::hours(-1)).is_renewable_at(now));

        let s = session(false, Duration::hours(1));
        assert!(!s.is_renewable_at(s.expires_at), "expiry instant itself is not renewable");
    }
}
