use chrono::Utc;

use crate::domain::{Membership, MembershipKey, NewMembership};
use crate::repository::{
    Creator, Deleter, Reader, RepositoryError, RepositoryOperation, RepositoryResult,
};

use super::database::{Database, MembershipRow};
use super::db_error;

/// Rows of the `class_members` relation table
#[derive(Clone)]
pub struct MembershipRepository {
    db: Database,
}

impl MembershipRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Creator<Membership, NewMembership> for MembershipRepository {
    async fn add(&self, input: NewMembership) -> RepositoryResult<Membership> {
        let op = RepositoryOperation::Create;
        let mut tx = self.db.pool().begin().await.map_err(db_error(op))?;

        for (table, id) in [
            ("classes", input.class_id.as_str()),
            ("users", input.user_id.as_str()),
        ] {
            let exists: bool = sqlx::query_scalar(&format!(
                "SELECT EXISTS (SELECT 1 FROM {table} WHERE id = ?)"
            ))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error(op))?;
            if !exists {
                return Err(RepositoryError::not_found(table, id).with_operation(op));
            }
        }

        tracing::debug!(
            class_id = %input.class_id,
            user_id = %input.user_id,
            "inserting membership"
        );
        let row: MembershipRow = sqlx::query_as(&format!(
            "INSERT INTO class_members (class_id, user_id, joined_at) VALUES (?, ?, ?) \
             RETURNING {}",
            MembershipRow::COLUMNS
        ))
        .bind(input.class_id.as_str())
        .bind(input.user_id.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error(op))?;
        tx.commit().await.map_err(db_error(op))?;
        row.try_into()
    }
}

impl Reader<MembershipKey, Membership> for MembershipRepository {
    async fn get(&self, key: &MembershipKey) -> RepositoryResult<Option<Membership>> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM class_members WHERE class_id = ? AND user_id = ?",
            MembershipRow::COLUMNS
        ))
        .bind(key.class_id.as_str())
        .bind(key.user_id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Get))?;
        row.map(Membership::try_from).transpose()
    }
}

impl Deleter<MembershipKey, Membership> for MembershipRepository {
    async fn delete(&self, key: &MembershipKey) -> RepositoryResult<Membership> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "DELETE FROM class_members WHERE class_id = ? AND user_id = ? RETURNING {}",
            MembershipRow::COLUMNS
        ))
        .bind(key.class_id.as_str())
        .bind(key.user_id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Delete))?;
        row.ok_or_else(|| {
            let id = format!("{}/{}", key.class_id, key.user_id);
            RepositoryError::not_found("class_members", id)
                .with_operation(RepositoryOperation::Delete)
        })?
        .try_into()
    }
}
