use crate::domain::{Executor, NewTag, Role, Tag, TagCriteria};
use crate::error::Result;
use crate::ids::TagId;
use crate::repository::{Creator, Deleter, PaginatedQuery, Querier};

use super::error::{translate, translate_conflict, UseCaseResult};
use super::guard::{authorize, validate};
use super::traits::UseCase;

/// Create a tag. Admins and teachers only.
#[derive(Clone)]
pub struct CreateTag<R> {
    tags: R,
}

impl<R> CreateTag<R> {
    pub fn new(tags: R) -> Self {
        Self { tags }
    }
}

impl<R: Creator<Tag, NewTag>> UseCase for CreateTag<R> {
    type Input = NewTag;
    type Output = Tag;

    async fn execute(&self, executor: &Executor, input: NewTag) -> Result<UseCaseResult<Tag>> {
        const NAME: &str = "create_tag";
        try_outcome!(authorize(
            NAME,
            executor,
            executor.has_any_role(&[Role::Admin, Role::Teacher])
        ));
        try_outcome!(validate(NAME, &input));

        let text = input.text.clone();
        let tag = try_outcome!(translate_conflict(
            NAME,
            self.tags.add(input).await,
            format!("tag '{text}' already exists")
        )?);
        tracing::info!(tag_id = %tag.id, executor_id = %executor.id, "tag created");
        Ok(Ok(tag))
    }
}

/// Search tags. Open to every executor.
#[derive(Clone)]
pub struct SearchTags<R> {
    tags: R,
}

impl<R> SearchTags<R> {
    pub fn new(tags: R) -> Self {
        Self { tags }
    }
}

impl<R: Querier<Tag, TagCriteria>> UseCase for SearchTags<R> {
    type Input = TagCriteria;
    type Output = PaginatedQuery<Tag, TagCriteria>;

    async fn execute(
        &self,
        _executor: &Executor,
        criteria: TagCriteria,
    ) -> Result<UseCaseResult<Self::Output>> {
        translate("search_tags", self.tags.get_by(criteria).await)
    }
}

/// Delete a tag. Admins only.
#[derive(Clone)]
pub struct DeleteTag<R> {
    tags: R,
}

impl<R> DeleteTag<R> {
    pub fn new(tags: R) -> Self {
        Self { tags }
    }
}

impl<R: Deleter<TagId, Tag>> UseCase for DeleteTag<R> {
    type Input = TagId;
    type Output = Tag;

    async fn execute(&self, executor: &Executor, id: TagId) -> Result<UseCaseResult<Tag>> {
        const NAME: &str = "delete_tag";
        try_outcome!(authorize(NAME, executor, executor.is_admin()));

        let tag = try_outcome!(translate(NAME, self.tags.delete(&id).await)?);
        tracing::info!(tag_id = %tag.id, executor_id = %executor.id, "tag deleted");
        Ok(Ok(tag))
    }
}
