//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept any PostgreSQL executor (a pool or an open transaction) as
//! the first argument.

pub mod email_verification_repo;
pub mod identity_repo;
pub mod session_repo;

pub use email_verification_repo::EmailVerificationRepo;
pub use identity_repo::IdentityRepo;
pub use session_repo::SessionRepo;
