/// Session primary keys are the refresh token's `jti` claim.
pub type SessionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
