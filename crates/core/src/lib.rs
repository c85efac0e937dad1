//! Shared trust primitives for every keyward service.
//!
//! - [`password`] -- Argon2id credential hashing and verification.
//! - [`token`] -- HS256 token codec with access/refresh kind tagging.
//! - [`gate`] -- Bearer-credential extraction and access-token verification.
//! - [`validation`] -- Username and email shape rules.
//! - [`verification`] -- One-time email verification codes.
//! - [`error`] -- The domain error taxonomy surfaced to calling services.

pub mod error;
pub mod gate;
pub mod password;
pub mod roles;
pub mod token;
pub mod types;
pub mod validation;
pub mod verification;
