use chrono::Utc;

use crate::domain::{NewUser, User, UserCriteria, UserUpdate};
use crate::ids::UserId;
use crate::repository::{
    Creator, Criteria, Deleter, FilterCondition, PageSize, PaginatedQuery, Querier, Reader,
    RepositoryError, RepositoryOperation, RepositoryResult, Updater,
};

use super::database::{Database, UserRow};
use super::{db_error, sql};

/// Users, unique by email
///
/// A user who still owns classes cannot be deleted; their memberships go
/// with them.
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
    page_size: PageSize,
}

impl UserRepository {
    pub fn new(db: Database, page_size: PageSize) -> Self {
        Self { db, page_size }
    }
}

impl Creator<User, NewUser> for UserRepository {
    async fn add(&self, input: NewUser) -> RepositoryResult<User> {
        let id = UserId::new();
        tracing::debug!(user_id = %id, role = %input.role, "inserting user");
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, name, email, role, created_at) VALUES (?, ?, ?, ?, ?) \
             RETURNING {}",
            UserRow::COLUMNS
        ))
        .bind(id.as_str())
        .bind(input.name)
        .bind(input.email)
        .bind(input.role.as_str())
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Create))?;
        row.try_into()
    }
}

impl Reader<UserId, User> for UserRepository {
    async fn get(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", UserRow::COLUMNS))
                .bind(id.as_str())
                .fetch_optional(self.db.pool())
                .await
                .map_err(db_error(RepositoryOperation::Get))?;
        row.map(User::try_from).transpose()
    }
}

impl Updater<User, UserUpdate> for UserRepository {
    async fn update(&self, input: UserUpdate) -> RepositoryResult<User> {
        tracing::debug!(user_id = %input.id, "updating user");
        let UserUpdate {
            id,
            name,
            email,
            role,
        } = input;
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), \
             role = COALESCE(?, role) WHERE id = ? RETURNING {}",
            UserRow::COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(role.map(|role| role.as_str()))
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Update))?;
        row.ok_or_else(|| {
            RepositoryError::not_found("users", id.as_str())
                .with_operation(RepositoryOperation::Update)
        })?
        .try_into()
    }
}

impl Deleter<UserId, User> for UserRepository {
    async fn delete(&self, id: &UserId) -> RepositoryResult<User> {
        let op = RepositoryOperation::Delete;
        let mut tx = self.db.pool().begin().await.map_err(db_error(op))?;

        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes WHERE owner_id = ?")
            .bind(id.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error(op))?;
        if owned > 0 {
            return Err(RepositoryError::constraint_violation(
                op,
                format!("user still owns {owned} classes"),
            )
            .with_entity("users", id.as_str()));
        }

        // memberships follow through ON DELETE CASCADE
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "DELETE FROM users WHERE id = ? RETURNING {}",
            UserRow::COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error(op))?;
        let row = row.ok_or_else(|| {
            RepositoryError::not_found("users", id.as_str()).with_operation(op)
        })?;
        tx.commit().await.map_err(db_error(op))?;

        tracing::debug!(user_id = %id, "user deleted");
        row.try_into()
    }
}

impl Querier<User, UserCriteria> for UserRepository {
    async fn get_by(
        &self,
        criteria: UserCriteria,
    ) -> RepositoryResult<PaginatedQuery<User, UserCriteria>> {
        let mut filters = Vec::new();
        if let Some(name) = &criteria.name {
            filters.push(name.to_filter("name"));
        }
        if let Some(email) = &criteria.email {
            filters.push(email.to_filter("email"));
        }
        if let Some(role) = criteria.role {
            filters.push(FilterCondition::eq("role", role.as_str()));
        }

        let window = self.page_size.window(criteria.page());
        let mut tx = self.db.pool().begin().await?;
        let (total, rows): (u64, Vec<UserRow>) =
            sql::select_page(&mut tx, "users", UserRow::COLUMNS, &filters, window).await?;
        tx.commit().await?;
        tracing::debug!(total, filters = filters.len(), "user query");

        let results = rows.into_iter().map(User::try_from).collect::<RepositoryResult<_>>()?;
        Ok(PaginatedQuery::new(criteria, self.page_size, total, results))
    }
}
