use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ClassId, UserId};

/// A user enrolled in a class
///
/// Stored in its own relation table; a `(class_id, user_id)` pair appears
/// at most once and both sides must exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub class_id: ClassId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}

/// Identifies one membership
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipKey {
    pub class_id: ClassId,
    pub user_id: UserId,
}

impl MembershipKey {
    #[must_use]
    pub fn new(class_id: ClassId, user_id: UserId) -> Self {
        Self { class_id, user_id }
    }
}

/// Input for enrolling a user
pub type NewMembership = MembershipKey;
