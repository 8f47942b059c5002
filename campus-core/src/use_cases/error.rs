//! Business outcomes of a use case

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::{RepositoryResult, StorageErrorClass};
use crate::validation::FieldError;

/// Result of a use case once unexpected failures are ruled out
pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;

/// Expected, user-facing failure of a use case
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum UseCaseError {
    /// One or more input fields failed validation
    #[error("invalid input ({} fields)", .fields.len())]
    InputError {
        /// Every failing field
        fields: Vec<FieldError>,
    },

    /// The executor may not perform this operation
    #[error("unauthorized")]
    Unauthorized,

    /// The target does not exist
    #[error("not found")]
    NotFound,

    /// The operation collides with existing state
    #[error("conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },
}

/// Conflict message when nothing more specific is known
pub const CONFLICTING_STATE: &str = "conflicts with the current state";

impl UseCaseError {
    /// A conflict; an empty message is replaced by [`CONFLICTING_STATE`]
    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Conflict {
            message: if message.trim().is_empty() {
                CONFLICTING_STATE.to_string()
            } else {
                message
            },
        }
    }
}

/// Translate a repository outcome into a use-case outcome
///
/// Not-found and uniqueness violations become business outcomes; every
/// other storage failure stays an unexpected [`crate::Error`].
pub(crate) fn translate<T>(
    use_case: &'static str,
    result: RepositoryResult<T>,
) -> crate::Result<UseCaseResult<T>> {
    translate_conflict(use_case, result, CONFLICTING_STATE)
}

/// [`translate`], naming what a uniqueness violation collided with
pub(crate) fn translate_conflict<T>(
    use_case: &'static str,
    result: RepositoryResult<T>,
    conflict: impl Into<String>,
) -> crate::Result<UseCaseResult<T>> {
    let err = match result {
        Ok(value) => return Ok(Ok(value)),
        Err(err) => err,
    };
    match err.classify() {
        StorageErrorClass::NotFound => {
            tracing::debug!(use_case, error = %err, "target not found");
            Ok(Err(UseCaseError::NotFound))
        }
        StorageErrorClass::UniqueConstraintViolation => {
            tracing::warn!(use_case, error = %err, "conflict");
            Ok(Err(UseCaseError::conflict(conflict)))
        }
        StorageErrorClass::Other => {
            tracing::error!(use_case, error = %err, "storage failure");
            Err(err.into())
        }
    }
}
