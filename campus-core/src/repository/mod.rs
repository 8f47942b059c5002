//! Generic repository contracts and the criteria query model
//!
//! This module provides the capability traits every entity repository
//! implements, the predicate model queriers translate their criteria into,
//! and the pagination envelope they answer with.
//!
//! # Features
//!
//! - **Capabilities**: [`Creator`], [`Reader`], [`Updater`], [`Deleter`], [`Querier`]
//! - **Text search**: [`StringQuery`] with a closed set of [`SearchType`]s
//! - **Criteria**: [`Criteria`] trait carrying the requested page
//! - **Pagination**: [`PaginatedQuery`] envelope and [`PageSize`]
//! - **Predicates**: [`FilterCondition`] for the storage engine
//! - **Errors**: [`RepositoryError`] reduced to [`StorageErrorClass`] for use cases
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_core::repository::{
//!     Criteria, FilterCondition, PageSize, PaginatedQuery, Querier, RepositoryResult,
//! };
//!
//! impl Querier<Tag, TagCriteria> for TagRepository {
//!     async fn get_by(
//!         &self,
//!         criteria: TagCriteria,
//!     ) -> RepositoryResult<PaginatedQuery<Tag, TagCriteria>> {
//!         let mut filters = Vec::new();
//!         if let Some(text) = &criteria.text {
//!             filters.push(text.to_filter("text"));
//!         }
//!         let window = self.page_size.window(criteria.page());
//!         let (total, rows) = self.select_page(&filters, window).await?;
//!         let tags = rows.into_iter().map(Tag::try_from).collect::<RepositoryResult<_>>()?;
//!         Ok(PaginatedQuery::new(criteria, self.page_size, total, tags))
//!     }
//! }
//! ```

mod error;
mod pagination;
mod query;
mod traits;

// Re-export all public types
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation, StorageErrorClass};
pub use pagination::{FilterCondition, FilterOperator, FilterValue, Pagination};
pub use query::{Criteria, PageSize, PaginatedQuery, SearchType, StringQuery};
pub use traits::{Creator, Deleter, Querier, Reader, RepositoryResult, Updater};
