use serde::{Deserialize, Serialize};

use crate::ids::UserId;

use super::user::Role;

/// The authenticated caller of a use case
///
/// Authentication happens upstream; the value is trusted as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    pub id: UserId,
    pub role: Role,
}

impl Executor {
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the executor holds one of `roles`
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Whether the executor is the user `id`
    #[must_use]
    pub fn is(&self, id: &UserId) -> bool {
        &self.id == id
    }

    /// Whether the executor is `owner` or an admin
    #[must_use]
    pub fn owns_or_admin(&self, owner: &UserId) -> bool {
        self.is_admin() || self.is(owner)
    }
}
