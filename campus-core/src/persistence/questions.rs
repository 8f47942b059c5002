use crate::domain::{NewQuestion, Question, QuestionCriteria};
use crate::ids::QuestionId;
use crate::repository::{
    Creator, Criteria, Deleter, FilterCondition, PageSize, PaginatedQuery, Querier, Reader,
    RepositoryError, RepositoryOperation, RepositoryResult,
};

use super::database::{Database, QuestionRow};
use super::{db_error, sql};

/// Test questions; a position is held by at most one question per test
///
/// Bodies are stored as the opaque payload they arrive as. Questions are
/// replaced, not edited, so there is no `Updater`.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Database,
    page_size: PageSize,
}

impl QuestionRepository {
    pub fn new(db: Database, page_size: PageSize) -> Self {
        Self { db, page_size }
    }
}

impl Creator<Question, NewQuestion> for QuestionRepository {
    async fn add(&self, input: NewQuestion) -> RepositoryResult<Question> {
        let id = QuestionId::new();
        tracing::debug!(
            question_id = %id,
            test_id = %input.test_id,
            position = input.position,
            payload_bytes = input.body.len(),
            "inserting question"
        );
        let row: QuestionRow = sqlx::query_as(&format!(
            "INSERT INTO questions (id, test_id, position, body) VALUES (?, ?, ?, ?) \
             RETURNING {}",
            QuestionRow::COLUMNS
        ))
        .bind(id.as_str())
        .bind(input.test_id.as_str())
        .bind(input.position)
        .bind(input.body.as_str())
        .fetch_one(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Create))?;
        row.try_into()
    }
}

impl Reader<QuestionId, Question> for QuestionRepository {
    async fn get(&self, id: &QuestionId) -> RepositoryResult<Option<Question>> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM questions WHERE id = ?",
            QuestionRow::COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Get))?;
        row.map(Question::try_from).transpose()
    }
}

impl Deleter<QuestionId, Question> for QuestionRepository {
    async fn delete(&self, id: &QuestionId) -> RepositoryResult<Question> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "DELETE FROM questions WHERE id = ? RETURNING {}",
            QuestionRow::COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Delete))?;
        row.ok_or_else(|| {
            RepositoryError::not_found("questions", id.as_str())
                .with_operation(RepositoryOperation::Delete)
        })?
        .try_into()
    }
}

impl Querier<Question, QuestionCriteria> for QuestionRepository {
    async fn get_by(
        &self,
        criteria: QuestionCriteria,
    ) -> RepositoryResult<PaginatedQuery<Question, QuestionCriteria>> {
        let filters = [FilterCondition::eq("test_id", criteria.test_id.as_str())];

        let window = self.page_size.window(criteria.page());
        let mut tx = self.db.pool().begin().await?;
        let (total, rows): (u64, Vec<QuestionRow>) =
            sql::select_page(&mut tx, "questions", QuestionRow::COLUMNS, &filters, window).await?;
        tx.commit().await?;
        tracing::debug!(total, test_id = %criteria.test_id, "question query");

        let results = rows
            .into_iter()
            .map(Question::try_from)
            .collect::<RepositoryResult<_>>()?;
        Ok(PaginatedQuery::new(criteria, self.page_size, total, results))
    }
}
