//! Crate-level error type
//!
//! These are the unexpected failures: broken configuration, storage faults
//! that are neither "not found" nor "already exists", undecodable payloads.
//! Expected business outcomes travel as
//! [`UseCaseError`](crate::use_cases::UseCaseError) inside the `Ok` side.

use thiserror::Error;

use crate::outcome::InvalidState;
use crate::repository::RepositoryError;

/// Result type alias using the crate's [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// Unexpected failure
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Storage failure a use case cannot classify
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// The connection pool could not be opened
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The schema could not be brought up to date
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Opaque payload could not be encoded or decoded
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// A value was unwrapped as the wrong variant
    #[error("{0}")]
    InvalidState(#[from] InvalidState),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
