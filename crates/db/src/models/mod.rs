//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - A `Serialize` response struct that omits secrets

pub mod email_verification;
pub mod identity;
pub mod session;
