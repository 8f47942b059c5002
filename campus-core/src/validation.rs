//! Field-level input validation
//!
//! Input types derive [`validator::Validate`]; [`Validate`] flattens its
//! nested error tree into one [`FieldError`] per failing rule, so a caller
//! can fix every problem in a single round trip.
//!
//! ```rust
//! use campus_core::validation::{field_errors, not_blank};
//!
//! #[derive(validator::Validate)]
//! struct Signup {
//!     #[validate(custom = "not_blank")]
//!     name: String,
//!     #[validate(email(message = "must be a valid email address"))]
//!     email: String,
//! }
//!
//! let signup = Signup { name: String::new(), email: "nope".into() };
//! let fields: Vec<_> = field_errors(&signup)
//!     .into_iter()
//!     .map(|e| e.field)
//!     .collect();
//! assert_eq!(fields, ["email", "name"]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// A single failing field
///
/// Both `field` and `message` are expected to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name; nested fields are dotted, list items indexed
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation collaborator: an empty list means the input is valid
pub trait Validate {
    /// Check every field and return all failures, ordered by field name
    fn validate(&self) -> Vec<FieldError>;
}

impl<T: validator::Validate> Validate for T {
    fn validate(&self) -> Vec<FieldError> {
        field_errors(self)
    }
}

/// Run `input`'s validator rules and flatten the result
pub fn field_errors<T: validator::Validate + ?Sized>(input: &T) -> Vec<FieldError> {
    let mut fields = Vec::new();
    if let Err(errors) = validator::Validate::validate(input) {
        flatten("", &errors, &mut fields);
    }
    // stable: several failures on one field keep their rule order
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                out.extend(
                    failures
                        .iter()
                        .map(|failure| FieldError::new(name.clone(), message(failure))),
                );
            }
            ValidationErrorsKind::Struct(nested) => flatten(&name, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(&format!("{name}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn message(failure: &ValidationError) -> String {
    failure
        .message
        .as_deref()
        .map_or_else(|| failure.code.to_string(), ToString::to_string)
}

/// A failure with a fixed code and message
pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Custom rule: text must contain something other than whitespace
///
/// # Errors
///
/// Returns a `blank` failure for empty or whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be blank"));
    }
    Ok(())
}
