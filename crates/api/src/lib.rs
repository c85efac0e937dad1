//! Keyward identity service library.
//!
//! Exposes the identity authority, the HTTP transport built on it, and the
//! shared configuration so integration tests and the binary entrypoint can
//! both assemble the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
