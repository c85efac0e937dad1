//! Repository for the `identities` table.

use sqlx::PgExecutor;

use crate::models::identity::{CreateIdentity, Identity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "username, full_name, email, phone_number, password_hash, role, \
                        is_verified, created_at, updated_at";

/// Provides create and lookup operations for identities.
pub struct IdentityRepo;

impl IdentityRepo {
    /// Insert a new identity, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateIdentity) -> Result<Identity, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO identities (username, full_name, email, phone_number, password_hash, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Identity>(&query)
            .bind(&input.username)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone_number)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(executor)
            .await
    }

    /// Find an identity by username (case-sensitive).
    pub async fn find_by_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Option<Identity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE username = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(username)
            .fetch_optional(executor)
            .await
    }

    /// Mark `username` verified, provided its email is still `email`.
    ///
    /// Returns `None` if the identity is gone or its address changed.
    pub async fn mark_verified<'e, E>(
        executor: E,
        username: &str,
        email: &str,
    ) -> Result<Option<Identity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE identities SET is_verified = true
             WHERE username = $1 AND email = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Identity>(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Find an identity by email (case-sensitive).
    pub async fn find_by_email<'e, E>(
        executor: E,
        email: &str,
    ) -> Result<Option<Identity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE email = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }
}
