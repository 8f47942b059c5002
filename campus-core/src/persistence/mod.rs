//! Concrete repositories over SQLite, through sqlx
//!
//! One repository per entity, each implementing only the capabilities the
//! entity supports:
//!
//! | Repository | Creator | Reader | Updater | Deleter | Querier |
//! |---|---|---|---|---|---|
//! | [`TagRepository`] | ✓ | ✓ | | ✓ | ✓ |
//! | [`UserRepository`] | ✓ | ✓ | ✓ | ✓ | ✓ |
//! | [`ClassRepository`] | ✓ | ✓ | ✓ | ✓ | ✓ |
//! | [`MembershipRepository`] | ✓ | ✓ | | ✓ | |
//! | [`QuestionRepository`] | ✓ | ✓ | | ✓ | ✓ |
//!
//! Uniqueness and referential integrity are enforced by the schema. An
//! operation that reads one table to decide a write on another runs both
//! inside a single transaction.

mod classes;
mod database;
mod memberships;
mod questions;
mod sql;
mod tags;
mod users;

pub use classes::ClassRepository;
pub use database::Database;
pub use memberships::MembershipRepository;
pub use questions::QuestionRepository;
pub use tags::TagRepository;
pub use users::UserRepository;

use crate::repository::{RepositoryError, RepositoryOperation};

/// Convert a driver error, recording which operation hit it
fn db_error(operation: RepositoryOperation) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}
