//! Shape rules for identity attributes accepted at registration.
//!
//! Usernames are restricted to lowercase letters, digits and underscores, so
//! they can never contain `@`. Emails always do. Login resolves a single
//! string against both columns, and keeping the two alphabets disjoint means
//! a username can never shadow somebody else's email.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 100;

/// Longest accepted email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters long"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username may contain only lowercase letters, digits or underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation(format!(
            "'{email}' is not an email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_accepts_plain_usernames() {
        let longest = "a".repeat(MAX_USERNAME_LEN);
        for name in ["abc", "alice", "bob_42", "___", longest.as_str()] {
            assert!(validate_username(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_rejects_usernames_outside_the_alphabet() {
        for name in [
            "alice@example.com",
            "Alice",
            "al ice",
            "al-ice",
            "al.ice",
            "ålice",
            "alice\n",
        ] {
            assert_matches!(
                validate_username(name),
                Err(CoreError::Validation(_)),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_usernames_outside_length_bounds() {
        let too_long = "a".repeat(MAX_USERNAME_LEN + 1);
        for name in ["", "ab", too_long.as_str()] {
            assert_matches!(validate_username(name), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.org").is_ok());

        for email in ["nope", "@example.com", "alice@", "alice@localhost", "a b@x.io", "a@b@c.io"] {
            assert_matches!(
                validate_email(email),
                Err(CoreError::Validation(_)),
                "{email:?} should be rejected"
            );
        }

        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        assert_matches!(validate_email(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_no_valid_username_is_a_valid_email() {
        for name in ["alice", "root", "a_b_c"] {
            assert!(validate_username(name).is_ok());
            assert!(validate_email(name).is_err());
        }
    }
}
