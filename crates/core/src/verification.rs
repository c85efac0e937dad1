//! One-time codes proving control of an email address.

use chrono::Duration;
use rand::Rng;

/// Number of alphanumeric characters in a verification code.
pub const SECRET_CODE_LENGTH: usize = 32;

/// How long an issued code stays redeemable.
pub fn verification_ttl() -> Duration {
    Duration::minutes(15)
}

/// Generate a fresh random verification code.
pub fn generate_secret_code() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Compare a presented code against the issued one without short-circuiting
/// on the first differing byte.
pub fn codes_match(issued: &str, presented: &str) -> bool {
    let (a, b) = (issued.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
