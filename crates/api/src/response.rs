//! Shared response envelope types for API handlers.
//!
//! Listing and lookup responses use a `{ "data": ... }` envelope. Token
//! responses are returned bare so clients can read the tokens directly.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
