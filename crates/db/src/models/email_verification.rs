//! Email verification code model.

use keyward_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A one-time code row from the `email_verifications` table.
///
/// Holds the secret code; never serialize it to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: Uuid,
    pub username: String,
    /// The address the code was sent to.
    pub email: String,
    pub secret_code: String,
    pub is_used: bool,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl EmailVerification {
    /// A code can be redeemed iff it is unused and unexpired.
    pub fn is_redeemable_at(&self, now: Timestamp) -> bool {
        !self.is_used && now < self.expires_at
    }
}

/// DTO for issuing a new verification code.
#[derive(Debug, Clone)]
pub struct CreateEmailVerification {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub secret_code: String,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn verification(is_used: bool, expires_in: Duration) -> EmailVerification {
        let now = Utc::now();
        EmailVerification {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            secret_code: "code".into(),
            is_used,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn test_redeemable_only_once_and_before_expiry() {
        let now = Utc::now();
        assert!(verification(false, Duration::minutes(15)).is_redeemable_at(now));
        assert!(!verification(true, Duration::minutes(15)).is_redeemable_at(now));
        assert!(!verification(false, Duration::minutes(-1)).is_redeemable_at(now));
    }
}
