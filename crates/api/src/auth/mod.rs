//! Identity Authority and the client details it records on sessions.

pub mod authority;
pub mod client;

pub use authority::{IdentityAuthority, IssuedSession, Registration, RenewedAccess};
pub use client::ClientMetadata;
