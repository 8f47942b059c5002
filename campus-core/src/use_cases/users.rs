use crate::domain::{Class, ClassCriteria, Executor, NewUser, User, UserUpdate};
use crate::error::Result;
use crate::ids::UserId;
use crate::repository::{Creator, Deleter, Querier, Reader, Updater};

use super::error::{
    translate, translate_conflict, UseCaseError, UseCaseResult, CONFLICTING_STATE,
};
use super::guard::{authorize, validate};
use super::traits::UseCase;

/// Register a user. Admins only.
#[derive(Clone)]
pub struct RegisterUser<R> {
    users: R,
}

impl<R> RegisterUser<R> {
    pub fn new(users: R) -> Self {
        Self { users }
    }
}

impl<R: Creator<User, NewUser>> UseCase for RegisterUser<R> {
    type Input = NewUser;
    type Output = User;

    async fn execute(&self, executor: &Executor, input: NewUser) -> Result<UseCaseResult<User>> {
        const NAME: &str = "register_user";
        try_outcome!(authorize(NAME, executor, executor.is_admin()));
        try_outcome!(validate(NAME, &input));

        let conflict = format!("email '{}' is already registered", input.email);
        let user = try_outcome!(translate_conflict(NAME, self.users.add(input).await, conflict)?);
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(Ok(user))
    }
}

/// Update a user
///
/// Users may update themselves; admins may update anyone. Changing the
/// role takes an admin, even for one's own account.
#[derive(Clone)]
pub struct UpdateUser<R> {
    users: R,
}

impl<R> UpdateUser<R> {
    pub fn new(users: R) -> Self {
        Self { users }
    }
}

impl<R> UseCase for UpdateUser<R>
where
    R: Reader<UserId, User> + Updater<User, UserUpdate>,
{
    type Input = UserUpdate;
    type Output = User;

    async fn execute(&self, executor: &Executor, input: UserUpdate) -> Result<UseCaseResult<User>> {
        const NAME: &str = "update_user";
        try_outcome!(authorize(
            NAME,
            executor,
            executor.owns_or_admin(&input.id)
        ));
        let Some(current) = self.users.get(&input.id).await? else {
            return Ok(Err(UseCaseError::NotFound));
        };
        let changes_role = input.role.is_some_and(|role| role != current.role);
        try_outcome!(authorize(
            NAME,
            executor,
            !changes_role || executor.is_admin()
        ));
        try_outcome!(validate(NAME, &input));

        let conflict = match &input.email {
            Some(email) => format!("email '{email}' is already registered"),
            None => CONFLICTING_STATE.to_string(),
        };
        let updated = self.users.update(input).await;
        let user = try_outcome!(translate_conflict(NAME, updated, conflict)?);
        tracing::info!(user_id = %user.id, executor_id = %executor.id, "user updated");
        Ok(Ok(user))
    }
}

/// Delete a user. Admins only, never themselves.
///
/// A user who still owns classes is a conflict; their classes must be
/// deleted or handed over first.
#[derive(Clone)]
pub struct DeleteUser<R, C> {
    users: R,
    classes: C,
}

impl<R, C> DeleteUser<R, C> {
    pub fn new(users: R, classes: C) -> Self {
        Self { users, classes }
    }
}

impl<R, C> UseCase for DeleteUser<R, C>
where
    R: Deleter<UserId, User>,
    C: Querier<Class, ClassCriteria>,
{
    type Input = UserId;
    type Output = User;

    async fn execute(&self, executor: &Executor, id: UserId) -> Result<UseCaseResult<User>> {
        const NAME: &str = "delete_user";
        try_outcome!(authorize(
            NAME,
            executor,
            executor.is_admin() && !executor.is(&id)
        ));

        let owned = ClassCriteria {
            owner_id: Some(id.clone()),
            ..ClassCriteria::all()
        };
        let owned = self.classes.get_by(owned).await?.total();
        if owned > 0 {
            tracing::warn!(user_id = %id, owned, "user still owns classes");
            return Ok(Err(UseCaseError::conflict("user still owns classes")));
        }

        let user = try_outcome!(translate(NAME, self.users.delete(&id).await)?);
        tracing::info!(user_id = %user.id, executor_id = %executor.id, "user deleted");
        Ok(Ok(user))
    }
}
