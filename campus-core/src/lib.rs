//! # campus-core
//!
//! Typed data-access and use-case layer for an education platform: tags,
//! users, classes with their members, and test questions.
//!
//! ## Features
//!
//! - **Outcome vocabulary**: [`Optional`](outcome::Optional) and
//!   [`Completion`](outcome::Completion) with exhaustive folding
//! - **Criteria queries**: [`StringQuery`](repository::StringQuery) filters and the
//!   [`PaginatedQuery`](repository::PaginatedQuery) envelope
//! - **Capability traits**: repositories implement only the operations their entity supports
//! - **Persistence**: SQLite through `sqlx`, with the schema migrated on connect
//! - **Use cases**: authorization, validation and storage-error translation into
//!   [`UseCaseError`](use_cases::UseCaseError)
//! - **Configuration**: layered defaults, TOML file and `CAMPUS_*` environment
//! - **Observability**: structured JSON logs through `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use campus_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let campus = Campus::connect(&config).await?;
//!     let admin = Executor::new(UserId::new(), Role::Admin);
//!
//!     match campus.create_tag().execute(&admin, NewTag::new("Rust")).await? {
//!         Ok(tag) => println!("created {}", tag.id),
//!         Err(rejected) => println!("rejected: {rejected}"),
//!     }
//!
//!     let criteria = TagCriteria::all().with_text(StringQuery::contains("Ru"));
//!     if let Ok(page) = campus.search_tags().execute(&admin, criteria).await? {
//!         println!("{} of {} tags", page.len(), page.total());
//!     }
//!     Ok(())
//! }
//! ```

pub mod campus;
pub mod config;
pub mod domain;
pub mod error;
pub mod ids;
pub mod observability;
pub mod outcome;
pub mod persistence;
pub mod repository;
pub mod use_cases;
pub mod validation;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::campus::{Campus, CampusBuilder};
    pub use crate::config::{Config, DatabaseConfig, PaginationConfig, ServiceConfig};
    pub use crate::domain::{
        Class, ClassCriteria, ClassDraft, ClassUpdate, Executor, Membership, MembershipKey,
        NewClass, NewMembership, NewQuestion, NewTag, NewUser, Payload, Question, QuestionBody,
        QuestionCriteria, QuestionDraft, Role, Tag, TagCriteria, User, UserCriteria, UserUpdate,
    };
    pub use crate::error::{Error, Result};
    pub use crate::ids::{ClassId, IdError, QuestionId, TagId, TestId, UserId};
    pub use crate::observability::init_tracing;
    pub use crate::outcome::{Completion, InvalidState, Optional, OptionalExt, ResultExt};
    pub use crate::persistence::{
        ClassRepository, Database, MembershipRepository, QuestionRepository, TagRepository,
        UserRepository,
    };
    pub use crate::repository::{
        Creator, Criteria, Deleter, PageSize, PaginatedQuery, Querier, Reader, RepositoryError,
        RepositoryResult, SearchType, StorageErrorClass, StringQuery, Updater,
    };
    pub use crate::use_cases::{
        AddQuestion, CreateClass, CreateTag, DeleteClass, DeleteTag, DeleteUser, EnrollMember,
        GetClass, ListQuestions, RegisterUser, SearchClasses, SearchTags, UpdateClass, UpdateUser,
        UseCase, UseCaseError, UseCaseResult,
    };
    pub use crate::validation::{FieldError, Validate};
}
