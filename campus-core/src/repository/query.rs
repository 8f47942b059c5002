//! Criteria, text search and the pagination envelope
//!
//! Every querier receives a typed criteria value and answers with a
//! [`PaginatedQuery`] that echoes the criteria back next to one page of
//! results.
//!
//! # Example
//!
//! ```rust
//! use campus_core::repository::{Criteria, PageSize, PaginatedQuery, SearchType, StringQuery};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct ByText {
//!     text: Option<StringQuery>,
//!     page: u32,
//! }
//!
//! impl Criteria for ByText {
//!     fn page(&self) -> u32 {
//!         self.page
//!     }
//! }
//!
//! let criteria = ByText { text: Some(StringQuery::new("rust", SearchType::Contains)), page: 2 };
//! let envelope = PaginatedQuery::new(criteria, PageSize::new(10), 25, vec!["a", "b"]);
//! assert_eq!(envelope.page(), 2);
//! assert_eq!(envelope.total_pages(), 3);
//! assert!(envelope.has_next());
//! ```

use serde::{Deserialize, Serialize};

use super::pagination::{FilterCondition, Pagination};

/// Text matching mode for a [`StringQuery`]
///
/// The set is closed: adding a mode forces every translation site to handle
/// it, because [`StringQuery::to_filter`] matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    /// Exact match
    #[default]
    Eq,
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
}

/// A text filter: what to look for and how
///
/// An empty `text` is valid. With [`SearchType::Eq`] it matches only empty
/// values; with the substring modes it matches every value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringQuery {
    /// Text to search for
    pub text: String,
    /// How `text` is compared to stored values
    #[serde(default)]
    pub search_type: SearchType,
}

impl StringQuery {
    /// Create a new text query
    pub fn new(text: impl Into<String>, search_type: SearchType) -> Self {
        Self {
            text: text.into(),
            search_type,
        }
    }

    /// Exact match
    pub fn eq(text: impl Into<String>) -> Self {
        Self::new(text, SearchType::Eq)
    }

    /// Substring match
    pub fn contains(text: impl Into<String>) -> Self {
        Self::new(text, SearchType::Contains)
    }

    /// Translate into a storage predicate on `field`
    pub fn to_filter(&self, field: &str) -> FilterCondition {
        let text = self.text.clone();
        match self.search_type {
            SearchType::Eq => FilterCondition::eq(field, text),
            SearchType::Contains => FilterCondition::contains(field, text),
            SearchType::StartsWith => FilterCondition::starts_with(field, text),
            SearchType::EndsWith => FilterCondition::ends_with(field, text),
        }
    }
}

/// A typed filter object for one querier
///
/// Implementors add `Option` fields (applied only when present) and plain
/// fields (always applied) next to the requested page.
pub trait Criteria: Clone + Send + Sync {
    /// Requested page, 1-based. Page 0 is read as page 1.
    fn page(&self) -> u32;
}

/// Number of results per page, fixed when a querier is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Page size used when none is configured
    pub const DEFAULT: Self = Self(20);

    /// Create a page size; zero is clamped to one.
    #[must_use]
    pub const fn new(size: u32) -> Self {
        if size == 0 {
            Self(1)
        } else {
            Self(size)
        }
    }

    /// The page size as a number
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Storage window for the given 1-based page
    #[must_use]
    pub const fn window(self, page: u32) -> Pagination {
        Pagination::page(page as u64, self.0 as u64)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One page of query results together with the criteria that produced it
///
/// `page` echoes the (normalised) requested page. When it lies beyond
/// `total_pages` the results are empty; otherwise `page <= total_pages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedQuery<T, C> {
    page: u32,
    total_pages: u32,
    total: u64,
    page_size: u32,
    criteria: C,
    results: Vec<T>,
}

impl<T, C: Criteria> PaginatedQuery<T, C> {
    /// Build the envelope for one page
    ///
    /// `total` is the number of rows matching the criteria across all pages.
    #[must_use]
    pub fn new(criteria: C, page_size: PageSize, total: u64, results: Vec<T>) -> Self {
        Self {
            page: criteria.page().max(1),
            total_pages: calculate_total_pages(total, page_size.get()),
            total,
            page_size: page_size.get(),
            criteria,
            results,
        }
    }
}

impl<T, C> PaginatedQuery<T, C> {
    /// Current page number (1-indexed)
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of pages needed to hold every match (0 when nothing matched)
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Number of matches across all pages
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Page size the querier was configured with
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The criteria that produced this page
    #[must_use]
    pub const fn criteria(&self) -> &C {
        &self.criteria
    }

    /// Results on this page
    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Take ownership of the results
    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    /// Number of results on this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether this page has no results
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether a later page holds more results
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Convert the results, keeping the rest of the envelope
    pub fn map<U, F>(self, f: F) -> PaginatedQuery<U, C>
    where
        F: FnMut(T) -> U,
    {
        PaginatedQuery {
            page: self.page,
            total_pages: self.total_pages,
            total: self.total,
            page_size: self.page_size,
            criteria: self.criteria,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Calculate total pages, rounding up
fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
