use keyward_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors raised by an [`AuthStore`](crate::AuthStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row with the same key already exists.
    #[error("Duplicate {entity}: {detail}")]
    Duplicate { entity: &'static str, detail: String },

    /// A write referenced a row that does not exist.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The implementation does not provide this operation.
    #[error("Store operation not implemented: {0}")]
    NotImplemented(&'static str),
}

impl StoreError {
    /// Classify a sqlx error raised while writing `entity`.
    ///
    /// Unique violations become [`StoreError::Duplicate`] and foreign key
    /// violations become [`StoreError::Integrity`]; everything else is kept.
    pub fn classify(err: sqlx::Error, entity: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return StoreError::Duplicate {
                        entity,
                        detail: db_err.constraint().unwrap_or("unique key").to_string(),
                    };
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return StoreError::Integrity(format!(
                        "{entity} references a missing row ({})",
                        db_err.constraint().unwrap_or("foreign key")
                    ));
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate {
                entity: "identity", ..
            } => CoreError::Conflict("Username or email is already registered".into()),
            StoreError::NotImplemented(op) => CoreError::NotImplemented(op),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_duplicate_identity_is_a_conflict() {
        let err = StoreError::Duplicate {
            entity: "identity",
            detail: "identities_pkey".into(),
        };
        assert_matches!(CoreError::from(err), CoreError::Conflict(_));
    }

    #[test]
    fn test_duplicate_session_is_internal() {
        let err = StoreError::Duplicate {
            entity: "session",
            detail: "sessions_pkey".into(),
        };
        assert_matches!(CoreError::from(err), CoreError::Internal(_));
    }

    #[test]
    fn test_not_implemented_passes_through() {
        assert_matches!(
            CoreError::from(StoreError::NotImplemented("list_sessions_for")),
            CoreError::NotImplemented("list_sessions_for")
        );
    }

    #[test]
    fn test_non_database_sqlx_errors_are_kept() {
        assert_matches!(
            StoreError::classify(sqlx::Error::RowNotFound, "identity"),
            StoreError::Database(sqlx::Error::RowNotFound)
        );
    }
}
