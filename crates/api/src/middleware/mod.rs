//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Identity behind a valid access token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
