use crate::domain::{NewTag, Tag, TagCriteria};
use crate::ids::TagId;
use crate::repository::{
    Creator, Criteria, Deleter, PageSize, PaginatedQuery, Querier, Reader, RepositoryError,
    RepositoryOperation, RepositoryResult,
};

use super::database::{Database, TagRow};
use super::{db_error, sql};

/// Tags, unique by text
#[derive(Clone)]
pub struct TagRepository {
    db: Database,
    page_size: PageSize,
}

impl TagRepository {
    pub fn new(db: Database, page_size: PageSize) -> Self {
        Self { db, page_size }
    }
}

impl Creator<Tag, NewTag> for TagRepository {
    async fn add(&self, input: NewTag) -> RepositoryResult<Tag> {
        let id = TagId::new();
        tracing::debug!(tag_id = %id, text = %input.text, "inserting tag");
        let row: TagRow = sqlx::query_as(&format!(
            "INSERT INTO tags (id, text) VALUES (?, ?) RETURNING {}",
            TagRow::COLUMNS
        ))
        .bind(id.as_str())
        .bind(input.text)
        .fetch_one(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Create))?;
        row.try_into()
    }
}

impl Reader<TagId, Tag> for TagRepository {
    async fn get(&self, id: &TagId) -> RepositoryResult<Option<Tag>> {
        let row: Option<TagRow> =
            sqlx::query_as(&format!("SELECT {} FROM tags WHERE id = ?", TagRow::COLUMNS))
                .bind(id.as_str())
                .fetch_optional(self.db.pool())
                .await
                .map_err(db_error(RepositoryOperation::Get))?;
        row.map(Tag::try_from).transpose()
    }
}

impl Deleter<TagId, Tag> for TagRepository {
    async fn delete(&self, id: &TagId) -> RepositoryResult<Tag> {
        tracing::debug!(tag_id = %id, "deleting tag");
        let row: Option<TagRow> = sqlx::query_as(&format!(
            "DELETE FROM tags WHERE id = ? RETURNING {}",
            TagRow::COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Delete))?;
        row.ok_or_else(|| {
            RepositoryError::not_found("tags", id.as_str())
                .with_operation(RepositoryOperation::Delete)
        })?
        .try_into()
    }
}

impl Querier<Tag, TagCriteria> for TagRepository {
    async fn get_by(
        &self,
        criteria: TagCriteria,
    ) -> RepositoryResult<PaginatedQuery<Tag, TagCriteria>> {
        let mut filters = Vec::new();
        if let Some(text) = &criteria.text {
            filters.push(text.to_filter("text"));
        }

        let window = self.page_size.window(criteria.page());
        let mut tx = self.db.pool().begin().await?;
        let (total, rows): (u64, Vec<TagRow>) =
            sql::select_page(&mut tx, "tags", TagRow::COLUMNS, &filters, window).await?;
        tx.commit().await?;
        tracing::debug!(total, page = criteria.page(), "tag query");

        let results = rows.into_iter().map(Tag::try_from).collect::<RepositoryResult<_>>()?;
        Ok(PaginatedQuery::new(criteria, self.page_size, total, results))
    }
}
