//! Test questions with polymorphic bodies
//!
//! The body is a tagged sum type at the domain edge and an opaque
//! [`Payload`] everywhere below it: repositories store and return payloads
//! without looking inside.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::ids::{QuestionId, TestId};
use crate::repository::Criteria;
use crate::validation::{invalid, not_blank};

const PROMPT_MAX: usize = 4000;

/// The content of a question, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionBody {
    OpenText {
        prompt: String,
    },
    MultipleChoice {
        prompt: String,
        choices: Vec<String>,
        /// Index into `choices`
        answer: usize,
    },
    TrueFalse {
        statement: String,
        answer: bool,
    },
}

impl QuestionBody {
    /// The `kind` discriminator as serialised
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OpenText { .. } => "open_text",
            Self::MultipleChoice { .. } => "multiple_choice",
            Self::TrueFalse { .. } => "true_false",
        }
    }
}

/// Per-variant rules; field names are those of the variant
impl Validate for QuestionBody {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self {
            Self::OpenText { prompt } => check_text(&mut errors, "prompt", prompt),
            Self::MultipleChoice {
                prompt,
                choices,
                answer,
            } => {
                check_text(&mut errors, "prompt", prompt);
                if choices.len() < 2 {
                    errors.add("choices", invalid("too_few", "must offer at least two choices"));
                }
                if choices.iter().any(|choice| not_blank(choice).is_err()) {
                    errors.add("choices", invalid("blank", "choices must not be blank"));
                }
                if *answer >= choices.len() {
                    errors.add(
                        "answer",
                        invalid("out_of_range", "must point at one of the choices"),
                    );
                }
            }
            Self::TrueFalse { statement, .. } => check_text(&mut errors, "statement", statement),
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_text(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if let Err(blank) = not_blank(value) {
        errors.add(field, blank);
    } else if value.chars().count() > PROMPT_MAX {
        errors.add(field, invalid("length", "must be at most 4000 characters"));
    }
}

/// Serialised JSON content the storage layer treats as opaque
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(String);

impl Payload {
    /// Encode a value
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be represented as JSON.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Self)
    }

    /// Decode the payload into `T`
    ///
    /// # Errors
    ///
    /// Fails if the stored JSON does not describe a `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.0)
    }

    /// Wrap text read back from storage, as it was written
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Raw JSON text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the encoded payload in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A question at a fixed position within a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub test_id: TestId,
    pub position: u32,
    pub body: Payload,
}

impl Question {
    /// Decode the body
    ///
    /// # Errors
    ///
    /// Fails if the stored payload is not a [`QuestionBody`].
    pub fn body(&self) -> Result<QuestionBody, serde_json::Error> {
        self.body.decode()
    }
}

/// What a caller supplies to add a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuestionDraft {
    pub test_id: TestId,
    #[validate(range(min = 1, message = "must be 1 or greater"))]
    pub position: u32,
    #[validate]
    pub body: QuestionBody,
}

/// Repository input; `(test_id, position)` must be unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub test_id: TestId,
    pub position: u32,
    pub body: Payload,
}

impl QuestionDraft {
    /// Encode the body, producing the repository input
    ///
    /// # Errors
    ///
    /// Fails if the body cannot be encoded.
    pub fn encode(self) -> Result<NewQuestion, serde_json::Error> {
        Ok(NewQuestion {
            body: Payload::encode(&self.body)?,
            test_id: self.test_id,
            position: self.position,
        })
    }
}

/// Questions of one test; `test_id` is always applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCriteria {
    pub test_id: TestId,
    #[serde(default = "super::first_page")]
    pub page: u32,
}

impl QuestionCriteria {
    #[must_use]
    pub fn for_test(test_id: TestId) -> Self {
        Self { test_id, page: 1 }
    }

    #[must_use]
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

impl Criteria for QuestionCriteria {
    fn page(&self) -> u32 {
        self.page
    }
}
