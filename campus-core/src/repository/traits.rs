//! Repository capability traits
//!
//! Each capability is its own trait so an entity repository implements only
//! what it supports: a read-only catalogue implements [`Reader`] and
//! [`Querier`] and nothing else. The traits use RPITIT (return position
//! `impl Trait` in traits) for `async` methods without `async_trait`.
//!
//! # Overview
//!
//! - [`Creator`]: insert a new entity, enforcing storage invariants
//! - [`Reader`]: look up by id; absence is `Ok(None)`, never an error
//! - [`Updater`]: PATCH-style update; absent target is a not-found error
//! - [`Deleter`]: remove and return the pre-deletion snapshot
//! - [`Querier`]: criteria query returning one [`PaginatedQuery`] page
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_core::repository::{Reader, RepositoryResult};
//!
//! impl Reader<TagId, Tag> for TagRepository {
//!     async fn get(&self, id: &TagId) -> RepositoryResult<Option<Tag>> {
//!         Ok(self.tags.get(id.as_str()).await.map(Tag::from))
//!     }
//! }
//! ```

use std::future::Future;

use super::error::RepositoryError;
use super::query::{Criteria, PaginatedQuery};
use crate::outcome::Optional;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Insert capability
///
/// Uniqueness and referential violations come back as a classified
/// [`RepositoryError`]; concurrent inserts racing on the same unique key
/// are arbitrated by the storage engine and exactly one of them wins.
pub trait Creator<Domain, Input>: Send + Sync {
    /// Store a new entity built from `input` and return it
    fn add(&self, input: Input) -> impl Future<Output = RepositoryResult<Domain>> + Send;
}

/// Lookup-by-id capability
pub trait Reader<Id, Domain>: Send + Sync {
    /// Find an entity by id
    ///
    /// Returns `Ok(Some(entity))` if found, `Ok(None)` if not.
    fn get(&self, id: &Id) -> impl Future<Output = RepositoryResult<Optional<Domain>>> + Send;
}

/// Partial-update capability
///
/// Inputs carry the target id plus `Option` fields; `None` leaves the stored
/// value untouched.
pub trait Updater<Domain, Input>: Send + Sync {
    /// Apply `input` and return the updated entity
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the target does not exist.
    fn update(&self, input: Input) -> impl Future<Output = RepositoryResult<Domain>> + Send;
}

/// Removal capability
pub trait Deleter<Id, Domain>: Send + Sync {
    /// Delete an entity and return it as it was before deletion
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the target does not exist.
    fn delete(&self, id: &Id) -> impl Future<Output = RepositoryResult<Domain>> + Send;
}

/// Criteria query capability
pub trait Querier<Domain, C: Criteria>: Send + Sync {
    /// Return the requested page of entities matching every present criterion
    ///
    /// Zero matches is an empty page, not an error.
    fn get_by(
        &self,
        criteria: C,
    ) -> impl Future<Output = RepositoryResult<PaginatedQuery<Domain, C>>> + Send;
}
