use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::ids::{ClassId, UserId};
use crate::repository::{Criteria, StringQuery};
use crate::validation::not_blank;

/// A class owned by the user who created it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// What a caller supplies to open a class; the owner comes from the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClassDraft {
    #[validate(custom = "not_blank")]
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom = "not_blank")]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl ClassDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the owner, producing the repository input
    #[must_use]
    pub fn owned_by(self, owner_id: UserId) -> NewClass {
        NewClass {
            name: self.name,
            description: self.description,
            owner_id,
        }
    }
}

/// Repository input for creating a class; the owner must exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// Partial update of a class; `None` fields keep their stored value
///
/// `description` has three states: absent keeps it, `Some(None)` (JSON
/// `null`) clears it and `Some(Some(text))` replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClassUpdate {
    pub id: ClassId,
    #[serde(default)]
    #[validate(custom = "not_blank")]
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "not_blank")]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<Option<String>>,
}

/// A field that is present, even as `null`, deserializes to `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ClassUpdate {
    #[must_use]
    pub fn new(id: ClassId) -> Self {
        Self {
            id,
            name: None,
            description: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Remove the stored description
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }
}

/// Class search filter
///
/// `member_id` selects classes the user is enrolled in, resolved through
/// the membership relation rather than a column on the class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCriteria {
    #[serde(default)]
    pub name: Option<StringQuery>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub member_id: Option<UserId>,
    #[serde(default = "super::first_page")]
    pub page: u32,
}

impl ClassCriteria {
    #[must_use]
    pub fn all() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }
}

impl Criteria for ClassCriteria {
    fn page(&self) -> u32 {
        self.page
    }
}
