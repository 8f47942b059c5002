//! Type-safe entity identifiers using the TypeID specification
//!
//! Every entity id is a prefixed, UUIDv7-backed TypeID, e.g.
//! `usr_01h455vb4pex5vsknk084sn02q`. The prefix makes a user id impossible
//! to pass where a class id is expected, both at compile time (distinct Rust
//! types) and when parsing untrusted input (prefix check in [`FromStr`]).
//!
//! UUIDv7 ids sort by creation time, so primary-key order in storage is also
//! insertion order.
//!
//! ```rust
//! use campus_core::ids::{ClassId, UserId};
//! use std::str::FromStr;
//!
//! let id = UserId::new();
//! assert!(id.as_str().starts_with("usr_"));
//!
//! assert!(ClassId::from_str(id.as_str()).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error type for entity id parsing
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The id could not be parsed as a valid TypeID
    #[error("failed to parse id: {0}")]
    Parse(#[from] MagicTypeIdError),

    /// The prefix was not the expected value
    #[error("invalid prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        /// The expected prefix
        expected: &'static str,
        /// The actual prefix found
        actual: String,
    },
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(MagicTypeId);

        impl $name {
            /// The TypeID prefix for this entity
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh, time-sortable id
            #[must_use]
            pub fn new() -> Self {
                Self(Self::PREFIX.create_type_id::<V7>())
            }

            /// The id as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// The prefix portion of the id
            #[must_use]
            pub fn prefix(&self) -> &str {
                self.0.prefix().as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mti = MagicTypeId::from_str(s)?;
                if mti.prefix().as_str() != Self::PREFIX {
                    return Err(IdError::InvalidPrefix {
                        expected: Self::PREFIX,
                        actual: mti.prefix().as_str().to_string(),
                    });
                }
                Ok(Self(mti))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Tag`](crate::domain::Tag), prefix `tag`
    TagId,
    "tag"
);

entity_id!(
    /// Identifier of a [`User`](crate::domain::User), prefix `usr`
    UserId,
    "usr"
);

entity_id!(
    /// Identifier of a [`Class`](crate::domain::Class), prefix `cls`
    ClassId,
    "cls"
);

entity_id!(
    /// Identifier of a test that questions belong to, prefix `tst`
    TestId,
    "tst"
);

entity_id!(
    /// Identifier of a [`Question`](crate::domain::Question), prefix `qst`
    QuestionId,
    "qst"
);
