use crate::domain::{Executor, NewQuestion, Question, QuestionCriteria, QuestionDraft, Role};
use crate::error::Result;
use crate::repository::{Creator, PaginatedQuery, Querier};

use super::error::{translate, translate_conflict, UseCaseResult};
use super::guard::{authorize, validate};
use super::traits::UseCase;

/// Add a question to a test. Admins and teachers only.
#[derive(Clone)]
pub struct AddQuestion<R> {
    questions: R,
}

impl<R> AddQuestion<R> {
    pub fn new(questions: R) -> Self {
        Self { questions }
    }
}

impl<R: Creator<Question, NewQuestion>> UseCase for AddQuestion<R> {
    type Input = QuestionDraft;
    type Output = Question;

    async fn execute(
        &self,
        executor: &Executor,
        draft: QuestionDraft,
    ) -> Result<UseCaseResult<Question>> {
        const NAME: &str = "add_question";
        try_outcome!(authorize(
            NAME,
            executor,
            executor.has_any_role(&[Role::Admin, Role::Teacher])
        ));
        try_outcome!(validate(NAME, &draft));

        let kind = draft.body.kind();
        let conflict = format!("position {} is already taken in this test", draft.position);
        let input = draft.encode()?;
        let added = self.questions.add(input).await;
        let question = try_outcome!(translate_conflict(NAME, added, conflict)?);
        tracing::info!(
            question_id = %question.id,
            test_id = %question.test_id,
            kind,
            "question added"
        );
        Ok(Ok(question))
    }
}

/// Page through a test's questions. Open to every executor.
#[derive(Clone)]
pub struct ListQuestions<R> {
    questions: R,
}

impl<R> ListQuestions<R> {
    pub fn new(questions: R) -> Self {
        Self { questions }
    }
}

impl<R: Querier<Question, QuestionCriteria>> UseCase for ListQuestions<R> {
    type Input = QuestionCriteria;
    type Output = PaginatedQuery<Question, QuestionCriteria>;

    async fn execute(
        &self,
        _executor: &Executor,
        criteria: QuestionCriteria,
    ) -> Result<UseCaseResult<Self::Output>> {
        translate("list_questions", self.questions.get_by(criteria).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionBody;
    use crate::ids::{TestId, UserId};
    use crate::persistence::{Database, QuestionRepository};
    use crate::repository::{PageSize, RepositoryError, RepositoryOperation, RepositoryResult};
    use crate::use_cases::UseCaseError;

    async fn repo() -> QuestionRepository {
        QuestionRepository::new(Database::in_memory().await.unwrap(), PageSize::DEFAULT)
    }

    fn true_false(test_id: &TestId, position: u32) -> QuestionDraft {
        QuestionDraft {
            test_id: test_id.clone(),
            position,
            body: QuestionBody::TrueFalse {
                statement: "Ownership prevents data races".to_string(),
                answer: true,
            },
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let questions = repo().await;
        let teacher = Executor::new(UserId::new(), Role::Teacher);
        let test_id = TestId::new();

        let add = AddQuestion::new(questions.clone());
        let question = add
            .execute(&teacher, true_false(&test_id, 1))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            question.body().unwrap(),
            QuestionBody::TrueFalse { answer: true, .. }
        ));

        assert_eq!(
            add.execute(&teacher, true_false(&test_id, 1)).await.unwrap(),
            Err(UseCaseError::conflict("position 1 is already taken in this test"))
        );

        let student = Executor::new(UserId::new(), Role::Student);
        let page = ListQuestions::new(questions)
            .execute(&student, QuestionCriteria::for_test(test_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.results(), [question]);
    }

    #[tokio::test]
    async fn test_student_cannot_add() {
        let questions = repo().await;
        let student = Executor::new(UserId::new(), Role::Student);
        let mut draft = true_false(&TestId::new(), 0);
        draft.body = QuestionBody::OpenText {
            prompt: String::new(),
        };
        assert_eq!(
            AddQuestion::new(questions).execute(&student, draft).await.unwrap(),
            Err(UseCaseError::Unauthorized)
        );
    }

    struct BrokenStore;

    impl Creator<Question, NewQuestion> for BrokenStore {
        async fn add(&self, _input: NewQuestion) -> RepositoryResult<Question> {
            Err(RepositoryError::connection_failed("storage offline")
                .with_operation(RepositoryOperation::Create))
        }
    }

    #[tokio::test]
    async fn test_unclassified_storage_failure_escapes() {
        let admin = Executor::new(UserId::new(), Role::Admin);
        let err = AddQuestion::new(BrokenStore)
            .execute(&admin, true_false(&TestId::new(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Repository(ref e) if e.is_retriable()));
    }
}
