//! Repository error types
//!
//! Repository failures carry the operation that failed, a [`RepositoryErrorKind`]
//! and, where known, the entity involved. Use cases never match on storage
//! driver errors; they ask [`RepositoryError::classify`] for the closed
//! [`StorageErrorClass`] instead.
//!
//! # Example
//!
//! ```rust
//! use campus_core::repository::{RepositoryError, RepositoryErrorKind, StorageErrorClass};
//!
//! let error = RepositoryError::not_found("Class", "cls_01h455vb4pex5vsknk084sn02q");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.classify(), StorageErrorClass::NotFound);
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Reading a single entity by id
    Get,
    /// Running a criteria query
    Query,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Query => write!(f, "query"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity already exists (unique key taken)
    AlreadyExists,
    /// Other constraint violation (foreign key, check)
    ConstraintViolation,
    /// Failed to reach the storage engine
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Underlying database error
    DatabaseError,
    /// Stored payload could not be encoded or decoded
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The three storage outcomes a use case is allowed to tell apart
///
/// Everything that is neither a missing target nor a taken unique key is
/// `Other` and must be treated as an unexpected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorClass {
    /// The referenced entity does not exist
    NotFound,
    /// A unique key is already taken
    UniqueConstraintViolation,
    /// Anything else
    Other,
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "User", "Class")
    pub entity_type: Option<String>,
    /// The id or key of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    ///
    /// The operation defaults to [`RepositoryOperation::Get`]; chain
    /// [`with_operation`](Self::with_operation) when the miss happened
    /// during an update or delete.
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::Get,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create an "already exists" error with entity context
    ///
    /// # Example
    ///
    /// ```rust
    /// use campus_core::repository::RepositoryError;
    ///
    /// let error = RepositoryError::already_exists("User", "ada@example.com");
    /// assert_eq!(error.entity_id.as_deref(), Some("ada@example.com"));
    /// ```
    pub fn already_exists(entity_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::Create,
            kind: RepositoryErrorKind::AlreadyExists,
            message: "Entity already exists".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(identifier.into()),
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Query,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Create a serialization error
    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Reduce the error to the closed classification use cases depend on
    ///
    /// # Example
    ///
    /// ```rust
    /// use campus_core::repository::{RepositoryError, RepositoryOperation, StorageErrorClass};
    ///
    /// let taken = RepositoryError::already_exists("Tag", "rust");
    /// assert_eq!(taken.classify(), StorageErrorClass::UniqueConstraintViolation);
    ///
    /// let down = RepositoryError::connection_failed("refused");
    /// assert_eq!(down.classify(), StorageErrorClass::Other);
    /// ```
    #[must_use]
    pub const fn classify(&self) -> StorageErrorClass {
        match self.kind {
            RepositoryErrorKind::NotFound => StorageErrorClass::NotFound,
            RepositoryErrorKind::AlreadyExists => StorageErrorClass::UniqueConstraintViolation,
            RepositoryErrorKind::ConstraintViolation
            | RepositoryErrorKind::ConnectionFailed
            | RepositoryErrorKind::Timeout
            | RepositoryErrorKind::DatabaseError
            | RepositoryErrorKind::SerializationError
            | RepositoryErrorKind::Other => StorageErrorClass::Other,
        }
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

// The operation is unknown at this point; repositories chain `with_operation`.
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error as E;
        let op = RepositoryOperation::Query;
        match &err {
            E::RowNotFound => Self::new(op, RepositoryErrorKind::NotFound, "Row not found"),
            E::PoolTimedOut => Self::timeout(op, "Connection pool timed out"),
            E::PoolClosed | E::WorkerCrashed | E::Io(_) | E::Tls(_) => {
                Self::connection_failed(err.to_string())
            }
            E::ColumnDecode { .. } | E::Decode(_) | E::TypeNotFound { .. } => {
                Self::serialization_error(op, err.to_string())
            }
            E::Database(db_err) => {
                let kind = if db_err.is_unique_violation() {
                    RepositoryErrorKind::AlreadyExists
                } else if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                    RepositoryErrorKind::ConstraintViolation
                } else {
                    RepositoryErrorKind::DatabaseError
                };
                let mut error = Self::new(op, kind, db_err.message());
                if let Some(constraint) = db_err.constraint() {
                    error.entity_id = Some(constraint.to_string());
                }
                error
            }
            _ => Self::database_error(op, err.to_string()),
        }
    }
}
