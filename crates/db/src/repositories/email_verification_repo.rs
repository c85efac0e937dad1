//! Repository for the `email_verifications` table.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::email_verification::{CreateEmailVerification, EmailVerification};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, secret_code, is_used, expires_at, created_at";

/// Verification code queries. Only `is_used` is ever updated, and only from
/// `false` to `true`.
pub struct EmailVerificationRepo;

impl EmailVerificationRepo {
    /// Insert a new verification code, returning the created row.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateEmailVerification,
    ) -> Result<EmailVerification, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO email_verifications (id, username, email, secret_code, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(input.id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.secret_code)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<EmailVerification>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM email_verifications WHERE id = $1");
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Flip `is_used` on an unused, unexpired code.
    ///
    /// Returns `None` when the code is missing, already used or expired, so
    /// two concurrent redemptions cannot both succeed.
    pub async fn mark_used<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<EmailVerification>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE email_verifications SET is_used = true
             WHERE id = $1 AND is_used = false AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
