use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AccountId;

/// Role carried by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// Returns the persisted string form of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Verified identity of the caller for the duration of one request.
///
/// Only the authorization gate constructs this from a verified token and a
/// live account record; handlers receive it by value and never from the
/// request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub account_id: AccountId,
    pub role: Role,
}

impl CallerContext {
    pub const fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    /// Returns true if the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_persisted_form() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(ParseRoleError("superuser".to_string()))
        );
    }

    #[test]
    fn caller_admin_check() {
        assert!(CallerContext::new(AccountId::new(1), Role::Admin).is_admin());
        assert!(!CallerContext::new(AccountId::new(1), Role::Customer).is_admin());
    }
}
