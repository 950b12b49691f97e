use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marketplace role of a profile. Starts `Unset` and is assigned exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Unset,
    Client,
    Freelancer,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid role: {0}")]
pub struct InvalidRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unset => "unset",
            Role::Client => "client",
            Role::Freelancer => "freelancer",
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, Role::Unset)
    }

    /// Roles a user may pick for themselves; `unset` is never assignable.
    pub fn parse_assignable(value: &str) -> Result<Role, InvalidRole> {
        match value.parse::<Role>()? {
            Role::Unset => Err(InvalidRole(value.to_string())),
            role => Ok(role),
        }
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(Role::Unset),
            "client" => Ok(Role::Client),
            "freelancer" => Ok(Role::Freelancer),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = InvalidRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub bio: String,
    pub portfolio: String,
    pub hourly_rate: Option<Decimal>,
    pub availability: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProfile {
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub portfolio: String,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub availability: String,
}

impl NewProfile {
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

/// Partial update; `None` leaves the column untouched. The role is not
/// patchable here, only through role assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub portfolio: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub availability: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(v) = patch.user_name {
            self.user_name = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.portfolio {
            self.portfolio = v;
        }
        if let Some(v) = patch.hourly_rate {
            self.hourly_rate = Some(v);
        }
        if let Some(v) = patch.availability {
            self.availability = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_not_assignable() {
        assert_eq!(Role::parse_assignable("client"), Ok(Role::Client));
        assert_eq!(Role::parse_assignable("freelancer"), Ok(Role::Freelancer));
        assert!(Role::parse_assignable("unset").is_err());
        assert!(Role::parse_assignable("admin").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Freelancer).unwrap(), "freelancer");
        assert!(!Role::default().is_assigned());
    }
}
