//! Well-known roles and their ordering.
//!
//! Role names must match the `CHECK` constraint on `users.role` and
//! `lessons.min_role` in `20260301000001_create_users.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

/// A user role. Variants are ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
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

    /// Whether this role meets a minimum requirement.
    pub fn satisfies(self, min: Role) -> bool {
        self >= min
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Names of every role this role satisfies, for `min_role = ANY($n)` filters.
    pub fn satisfied_names(self) -> Vec<&'static str> {
        ALL_ROLES
            .iter()
            .filter(|r| self.satisfies(**r))
            .map(|r| r.as_str())
            .collect()
    }
}

/// All roles, least privileged first.
pub const ALL_ROLES: &[Role] = &[Role::User, Role::Admin];

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
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Valid roles: {ROLE_USER}, {ROLE_ADMIN}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn admin_satisfies_every_minimum() {
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::Admin.satisfies(Role::Admin));
    }

    #[test]
    fn user_does_not_satisfy_admin() {
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn satisfied_names_for_filters() {
        assert_eq!(Role::User.satisfied_names(), vec!["USER"]);
        assert_eq!(Role::Admin.satisfied_names(), vec!["USER", "ADMIN"]);
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn rejects_unknown_and_lowercase_names() {
        assert_matches!("admin".parse::<Role>(), Err(CoreError::Validation(_)));
        assert_matches!("creator".parse::<Role>(), Err(CoreError::Validation(_)));
    }
}
