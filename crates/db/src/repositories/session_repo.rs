//! Repository for the `sessions` table.

use keyward_core::types::SessionId;
use sqlx::PgExecutor;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, refresh_token, user_agent, client_ip, is_blocked, \
                        expires_at, created_at";

/// Session ledger queries. The refresh token and owner are write-once;
/// only `is_blocked` is ever updated.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateSession) -> Result<Session, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO sessions (id, username, refresh_token, user_agent, client_ip, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.id)
            .bind(&input.username)
            .bind(&input.refresh_token)
            .bind(&input.user_agent)
            .bind(&input.client_ip)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Point lookup by session id, regardless of blocked or expiry state.
    pub async fn find_by_id<'e, E>(executor: E, id: SessionId) -> Result<Option<Session>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every session owned by `username`, newest first.
    pub async fn list_for_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Vec<Session>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions WHERE username = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(username)
            .fetch_all(executor)
            .await
    }

    /// Set the blocked flag on one session. Returns `true` if the row exists.
    pub async fn set_blocked<'e, E>(
        executor: E,
        id: SessionId,
        blocked: bool,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE sessions SET is_blocked = $2 WHERE id = $1")
            .bind(id)
            .bind(blocked)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Block all open sessions for a username. Returns the count newly blocked.
    pub async fn block_all_for_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE sessions SET is_blocked = true
             WHERE username = $1 AND is_blocked = false",
        )
        .bind(username)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
