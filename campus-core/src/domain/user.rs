use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::UserId;
use crate::repository::{Criteria, StringQuery};
use crate::validation::not_blank;

/// What a user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Stable lowercase name, as stored and serialised
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A registered account; `email` is unique across all users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(custom = "not_blank")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub role: Role,
}

/// Partial update of a user; `None` fields keep their stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    pub id: UserId,
    #[serde(default)]
    #[validate(custom = "not_blank")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// An update that changes nothing yet
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            email: None,
            role: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// User search filter; present fields are AND-ed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCriteria {
    #[serde(default)]
    pub name: Option<StringQuery>,
    #[serde(default)]
    pub email: Option<StringQuery>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "super::first_page")]
    pub page: u32,
}

impl UserCriteria {
    #[must_use]
    pub fn all() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }
}

impl Criteria for UserCriteria {
    fn page(&self) -> u32 {
        self.page
    }
}
