//! Optional and Result vocabulary
//!
//! Expected absence is an [`Optional`], expected failure is a
//! [`Result`]. Both are the standard library types: they already carry the
//! `Some`/`None` and `Ok`/`Err` semantics, the `map`/`and_then`/`or_else`
//! combinators and the panicking `unwrap` family. This module adds the
//! pieces the rest of the crate leans on:
//!
//! - [`Completion`] for operations that succeed without a value
//! - [`OptionalExt::fold`] and [`ResultExt::fold`] for total case analysis
//! - non-panicking `try_unwrap` variants returning [`InvalidState`]
//!
//! # Example
//!
//! ```rust
//! use campus_core::outcome::{Optional, OptionalExt, ResultExt};
//!
//! let found: Optional<u32> = Some(3);
//! let label = found.fold(|n| format!("found {n}"), || "missing".to_string());
//! assert_eq!(label, "found 3");
//!
//! let failed: Result<u32, &str> = Err("boom");
//! assert!(failed.try_unwrap().is_err());
//! ```

use std::fmt;

/// A value of type `T`, or nothing.
pub type Optional<T> = Option<T>;

/// Outcome of an operation that carries no success value.
pub type Completion<E> = Result<(), E>;

/// Which variant was expected when an invalid-state access was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// `Some`
    Some,
    /// `None`
    None,
    /// `Ok`
    Ok,
    /// `Err`
    Err,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Some => write!(f, "Some"),
            Self::None => write!(f, "None"),
            Self::Ok => write!(f, "Ok"),
            Self::Err => write!(f, "Err"),
        }
    }
}

/// Access to the wrong variant of an [`Optional`] or [`Result`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid state: expected {expected} but found {found}")]
pub struct InvalidState {
    /// Variant the caller asked for
    pub expected: Variant,
    /// Variant actually present
    pub found: Variant,
}

impl InvalidState {
    const fn new(expected: Variant, found: Variant) -> Self {
        Self { expected, found }
    }
}

/// Extra combinators for [`Optional`]
pub trait OptionalExt<T> {
    /// Total case analysis: `on_some` for a value, `on_none` otherwise.
    fn fold<U>(self, on_some: impl FnOnce(T) -> U, on_none: impl FnOnce() -> U) -> U;

    /// Checked unwrap.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState`] when called on `None`.
    fn try_unwrap(self) -> Result<T, InvalidState>;
}

impl<T> OptionalExt<T> for Option<T> {
    fn fold<U>(self, on_some: impl FnOnce(T) -> U, on_none: impl FnOnce() -> U) -> U {
        match self {
            Some(value) => on_some(value),
            None => on_none(),
        }
    }

    fn try_unwrap(self) -> Result<T, InvalidState> {
        self.ok_or(InvalidState::new(Variant::Some, Variant::None))
    }
}

/// Extra combinators for [`Result`]
pub trait ResultExt<T, E> {
    /// Total case analysis: `on_ok` for success, `on_err` for failure.
    fn fold<U>(self, on_ok: impl FnOnce(T) -> U, on_err: impl FnOnce(E) -> U) -> U;

    /// Checked unwrap of the success value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState`] when called on `Err`.
    fn try_unwrap(self) -> Result<T, InvalidState>;

    /// Checked unwrap of the error value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState`] when called on `Ok`.
    fn try_unwrap_err(self) -> Result<E, InvalidState>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn fold<U>(self, on_ok: impl FnOnce(T) -> U, on_err: impl FnOnce(E) -> U) -> U {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }

    fn try_unwrap(self) -> Result<T, InvalidState> {
        self.map_err(|_| InvalidState::new(Variant::Ok, Variant::Err))
    }

    fn try_unwrap_err(self) -> Result<E, InvalidState> {
        match self {
            Ok(_) => Err(InvalidState::new(Variant::Err, Variant::Ok)),
            Err(error) => Ok(error),
        }
    }
}
