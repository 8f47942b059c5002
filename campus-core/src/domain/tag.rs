use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::TagId;
use crate::repository::{Criteria, StringQuery};
use crate::validation::not_blank;

/// Longest accepted tag text, in characters
pub const TAG_TEXT_MAX: usize = 64;

/// A free-text label; `text` is unique across all tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub text: String,
}

/// Input for creating a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewTag {
    #[validate(custom = "not_blank")]
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub text: String,
}

impl NewTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Tag search filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCriteria {
    #[serde(default)]
    pub text: Option<StringQuery>,
    #[serde(default = "super::first_page")]
    pub page: u32,
}

impl TagCriteria {
    /// Every tag, first page
    #[must_use]
    pub fn all() -> Self {
        Self {
            text: None,
            page: 1,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: StringQuery) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

impl Criteria for TagCriteria {
    fn page(&self) -> u32 {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::field_errors;

    #[test]
    fn test_new_tag_validation() {
        assert!(field_errors(&NewTag::new("Rust")).is_empty());
        assert!(field_errors(&NewTag::new("é".repeat(TAG_TEXT_MAX))).is_empty());
        assert_eq!(field_errors(&NewTag::new("  "))[0].field, "text");
        assert_eq!(field_errors(&NewTag::new("x".repeat(TAG_TEXT_MAX + 1))).len(), 1);
    }

    #[test]
    fn test_criteria_deserialize_defaults() {
        let criteria: TagCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(criteria, TagCriteria::all());

        let criteria: TagCriteria =
            serde_json::from_str(r#"{"text":{"text":"ru","search_type":"STARTS_WITH"},"page":2}"#)
                .unwrap();
        assert_eq!(criteria.page(), 2);
        assert_eq!(
            criteria.text.map(|q| q.search_type),
            Some(crate::repository::SearchType::StartsWith)
        );
    }
}
