//! Identity roles.
//!
//! The string forms must match the `CHECK` constraint on `identities.role`
//! in `20260301000001_create_identities.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// Role assigned to an identity at registration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_forms() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("root".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err(), "role names are case-sensitive");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);
    }
}
