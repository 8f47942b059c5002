//! Use-case orchestration
//!
//! Use cases are generic over the repository capabilities they need, so the
//! same orchestration runs against the SQLite repositories or a test double.
//!
//! ```rust,ignore
//! use campus_core::prelude::*;
//!
//! let campus = Campus::connect(&Config::default()).await?;
//! let admin = Executor::new(UserId::new(), Role::Admin);
//!
//! match campus.create_tag().execute(&admin, NewTag::new("Rust")).await? {
//!     Ok(tag) => println!("created {}", tag.id),
//!     Err(UseCaseError::Conflict { message }) => println!("{message}"),
//!     Err(other) => println!("rejected: {other}"),
//! }
//! ```

// Unwrap a business outcome, returning early with its error.
macro_rules! try_outcome {
    ($outcome:expr) => {
        match $outcome {
            Ok(value) => value,
            Err(error) => return Ok(Err(error)),
        }
    };
}

mod classes;
mod error;
mod guard;
mod questions;
mod tags;
mod traits;
mod users;

pub use classes::{CreateClass, DeleteClass, EnrollMember, GetClass, SearchClasses, UpdateClass};
pub use error::{UseCaseError, UseCaseResult, CONFLICTING_STATE};
pub use questions::{AddQuestion, ListQuestions};
pub use tags::{CreateTag, DeleteTag, SearchTags};
pub use traits::UseCase;
pub use users::{DeleteUser, RegisterUser, UpdateUser};
