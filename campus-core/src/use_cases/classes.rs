use crate::domain::{
    Class, ClassCriteria, ClassDraft, ClassUpdate, Executor, Membership, NewClass, NewMembership,
    Role,
};
use crate::error::Result;
use crate::ids::ClassId;
use crate::repository::{Creator, Deleter, PaginatedQuery, Querier, Reader, Updater};

use super::error::{translate, translate_conflict, UseCaseError, UseCaseResult};
use super::guard::{authorize, validate};
use super::traits::UseCase;

/// Open a class owned by the executor. Admins and teachers only.
#[derive(Clone)]
pub struct CreateClass<R> {
    classes: R,
}

impl<R> CreateClass<R> {
    pub fn new(classes: R) -> Self {
        Self { classes }
    }
}

impl<R: Creator<Class, NewClass>> UseCase for CreateClass<R> {
    type Input = ClassDraft;
    type Output = Class;

    async fn execute(
        &self,
        executor: &Executor,
        draft: ClassDraft,
    ) -> Result<UseCaseResult<Class>> {
        const NAME: &str = "create_class";
        try_outcome!(authorize(
            NAME,
            executor,
            executor.has_any_role(&[Role::Admin, Role::Teacher])
        ));
        try_outcome!(validate(NAME, &draft));

        let input = draft.owned_by(executor.id.clone());
        let class = try_outcome!(translate(NAME, self.classes.add(input).await)?);
        tracing::info!(class_id = %class.id, owner_id = %class.owner_id, "class created");
        Ok(Ok(class))
    }
}

/// Fetch one class. Open to every executor.
#[derive(Clone)]
pub struct GetClass<R> {
    classes: R,
}

impl<R> GetClass<R> {
    pub fn new(classes: R) -> Self {
        Self { classes }
    }
}

impl<R: Reader<ClassId, Class>> UseCase for GetClass<R> {
    type Input = ClassId;
    type Output = Class;

    async fn execute(&self, _executor: &Executor, id: ClassId) -> Result<UseCaseResult<Class>> {
        Ok(self.classes.get(&id).await?.ok_or(UseCaseError::NotFound))
    }
}

/// Edit a class. Its owner or an admin only.
#[derive(Clone)]
pub struct UpdateClass<R> {
    classes: R,
}

impl<R> UpdateClass<R> {
    pub fn new(classes: R) -> Self {
        Self { classes }
    }
}

impl<R> UseCase for UpdateClass<R>
where
    R: Reader<ClassId, Class> + Updater<Class, ClassUpdate>,
{
    type Input = ClassUpdate;
    type Output = Class;

    async fn execute(
        &self,
        executor: &Executor,
        input: ClassUpdate,
    ) -> Result<UseCaseResult<Class>> {
        const NAME: &str = "update_class";
        let Some(target) = self.classes.get(&input.id).await? else {
            return Ok(Err(UseCaseError::NotFound));
        };
        try_outcome!(authorize(NAME, executor, executor.owns_or_admin(&target.owner_id)));
        try_outcome!(validate(NAME, &input));

        let class = try_outcome!(translate(NAME, self.classes.update(input).await)?);
        tracing::info!(class_id = %class.id, executor_id = %executor.id, "class updated");
        Ok(Ok(class))
    }
}

/// Delete a class and its memberships. Its owner or an admin only.
#[derive(Clone)]
pub struct DeleteClass<R> {
    classes: R,
}

impl<R> DeleteClass<R> {
    pub fn new(classes: R) -> Self {
        Self { classes }
    }
}

impl<R> UseCase for DeleteClass<R>
where
    R: Reader<ClassId, Class> + Deleter<ClassId, Class>,
{
    type Input = ClassId;
    type Output = Class;

    async fn execute(&self, executor: &Executor, id: ClassId) -> Result<UseCaseResult<Class>> {
        const NAME: &str = "delete_class";
        let Some(target) = self.classes.get(&id).await? else {
            return Ok(Err(UseCaseError::NotFound));
        };
        try_outcome!(authorize(NAME, executor, executor.owns_or_admin(&target.owner_id)));

        let class = try_outcome!(translate(NAME, self.classes.delete(&id).await)?);
        tracing::info!(class_id = %class.id, executor_id = %executor.id, "class deleted");
        Ok(Ok(class))
    }
}

/// Search classes by name, owner or member. Open to every executor.
#[derive(Clone)]
pub struct SearchClasses<R> {
    classes: R,
}

impl<R> SearchClasses<R> {
    pub fn new(classes: R) -> Self {
        Self { classes }
    }
}

impl<R: Querier<Class, ClassCriteria>> UseCase for SearchClasses<R> {
    type Input = ClassCriteria;
    type Output = PaginatedQuery<Class, ClassCriteria>;

    async fn execute(
        &self,
        _executor: &Executor,
        criteria: ClassCriteria,
    ) -> Result<UseCaseResult<Self::Output>> {
        translate("search_classes", self.classes.get_by(criteria).await)
    }
}

/// Enroll a user in a class. The class owner or an admin only.
#[derive(Clone)]
pub struct EnrollMember<C, M> {
    classes: C,
    members: M,
}

impl<C, M> EnrollMember<C, M> {
    pub fn new(classes: C, members: M) -> Self {
        Self { classes, members }
    }
}

impl<C, M> UseCase for EnrollMember<C, M>
where
    C: Reader<ClassId, Class>,
    M: Creator<Membership, NewMembership>,
{
    type Input = NewMembership;
    type Output = Membership;

    async fn execute(
        &self,
        executor: &Executor,
        input: NewMembership,
    ) -> Result<UseCaseResult<Membership>> {
        const NAME: &str = "enroll_member";
        let Some(class) = self.classes.get(&input.class_id).await? else {
            return Ok(Err(UseCaseError::NotFound));
        };
        try_outcome!(authorize(NAME, executor, executor.owns_or_admin(&class.owner_id)));

        let membership = try_outcome!(translate_conflict(
            NAME,
            self.members.add(input).await,
            "user is already enrolled in this class"
        )?);
        tracing::info!(
            class_id = %membership.class_id,
            user_id = %membership.user_id,
            "member enrolled"
        );
        Ok(Ok(membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MembershipKey, NewUser};
    use crate::ids::UserId;
    use crate::persistence::{ClassRepository, Database, MembershipRepository, UserRepository};
    use crate::repository::{PageSize, StringQuery};

    struct Fixture {
        users: UserRepository,
        classes: ClassRepository,
        members: MembershipRepository,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        Fixture {
            users: UserRepository::new(db.clone(), PageSize::DEFAULT),
            classes: ClassRepository::new(db.clone(), PageSize::DEFAULT),
            members: MembershipRepository::new(db),
        }
    }

    async fn seeded(f: &Fixture, email: &str, role: Role) -> Executor {
        let user = f
            .users
            .add(NewUser {
                name: "Someone".to_string(),
                email: email.to_string(),
                role,
            })
            .await
            .unwrap();
        Executor::new(user.id, role)
    }

    async fn open_class(f: &Fixture, owner: &Executor, name: &str) -> Class {
        CreateClass::new(f.classes.clone())
            .execute(owner, ClassDraft::new(name))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let f = fixture().await;
        let teacher = seeded(&f, "t@example.com", Role::Teacher).await;
        let class = open_class(&f, &teacher, "Algebra").await;
        assert_eq!(class.owner_id, teacher.id);
    }

    #[tokio::test]
    async fn test_student_cannot_create_even_with_invalid_input() {
        let f = fixture().await;
        let student = seeded(&f, "s@example.com", Role::Student).await;
        let outcome = CreateClass::new(f.classes.clone())
            .execute(&student, ClassDraft::new(""))
            .await
            .unwrap();
        assert_eq!(outcome, Err(UseCaseError::Unauthorized));
    }

    #[tokio::test]
    async fn test_unknown_executor_cannot_own() {
        let f = fixture().await;
        let ghost = Executor::new(UserId::new(), Role::Teacher);
        let outcome = CreateClass::new(f.classes.clone())
            .execute(&ghost, ClassDraft::new("Algebra"))
            .await
            .unwrap();
        assert_eq!(outcome, Err(UseCaseError::NotFound));
    }

    #[tokio::test]
    async fn test_get_class() {
        let f = fixture().await;
        let teacher = seeded(&f, "t@example.com", Role::Teacher).await;
        let class = open_class(&f, &teacher, "Algebra").await;
        let get = GetClass::new(f.classes.clone());

        let student = seeded(&f, "s@example.com", Role::Student).await;
        assert_eq!(get.execute(&student, class.id.clone()).await.unwrap(), Ok(class));
        assert_eq!(
            get.execute(&student, ClassId::new()).await.unwrap(),
            Err(UseCaseError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_update_requires_owner_or_admin() {
        let f = fixture().await;
        let owner = seeded(&f, "t@example.com", Role::Teacher).await;
        let other = seeded(&f, "o@example.com", Role::Teacher).await;
        let admin = seeded(&f, "a@example.com", Role::Admin).await;
        let class = open_class(&f, &owner, "Algebra").await;
        let update = UpdateClass::new(f.classes.clone());

        assert_eq!(
            update
                .execute(&other, ClassUpdate::new(class.id.clone()).name(""))
                .await
                .unwrap(),
            Err(UseCaseError::Unauthorized)
        );
        assert!(matches!(
            update
                .execute(&owner, ClassUpdate::new(class.id.clone()).name(""))
                .await
                .unwrap(),
            Err(UseCaseError::InputError { .. })
        ));
        let renamed = update
            .execute(&admin, ClassUpdate::new(class.id.clone()).name("Algebra II"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Algebra II");
        assert_eq!(
            update
                .execute(&admin, ClassUpdate::new(ClassId::new()).name("x"))
                .await
                .unwrap(),
            Err(UseCaseError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_owner_clears_description() {
        let f = fixture().await;
        let owner = seeded(&f, "t@example.com", Role::Teacher).await;
        let class = CreateClass::new(f.classes.clone())
            .execute(&owner, ClassDraft::new("Algebra").describe("Linear"))
            .await
            .unwrap()
            .unwrap();

        let update = UpdateClass::new(f.classes.clone());
        let renamed = update
            .execute(&owner, ClassUpdate::new(class.id.clone()).name("Algebra I"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("Linear"));

        let cleared = update
            .execute(&owner, ClassUpdate::new(class.id.clone()).clear_description())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.name, "Algebra I");
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn test_enroll_and_search_by_member() {
        let f = fixture().await;
        let owner = seeded(&f, "t@example.com", Role::Teacher).await;
        let student = seeded(&f, "s@example.com", Role::Student).await;
        let algebra = open_class(&f, &owner, "Algebra").await;
        open_class(&f, &owner, "Biology").await;

        let enroll = EnrollMember::new(f.classes.clone(), f.members.clone());
        let key = MembershipKey::new(algebra.id.clone(), student.id.clone());

        assert_eq!(
            enroll.execute(&student, key.clone()).await.unwrap(),
            Err(UseCaseError::Unauthorized)
        );
        enroll.execute(&owner, key.clone()).await.unwrap().unwrap();
        assert_eq!(
            enroll.execute(&owner, key).await.unwrap(),
            Err(UseCaseError::conflict("user is already enrolled in this class"))
        );
        assert_eq!(
            enroll
                .execute(&owner, MembershipKey::new(algebra.id.clone(), UserId::new()))
                .await
                .unwrap(),
            Err(UseCaseError::NotFound)
        );

        let search = SearchClasses::new(f.classes.clone());
        let mine = ClassCriteria {
            member_id: Some(student.id.clone()),
            ..ClassCriteria::all()
        };
        let page = search.execute(&student, mine).await.unwrap().unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(page.results()[0].id, algebra.id);

        let by_name = ClassCriteria {
            name: Some(StringQuery::new("logy", crate::repository::SearchType::EndsWith)),
            ..ClassCriteria::all()
        };
        let page = search.execute(&student, by_name).await.unwrap().unwrap();
        assert_eq!(page.results()[0].name, "Biology");
    }

    #[tokio::test]
    async fn test_delete_class() {
        let f = fixture().await;
        let owner = seeded(&f, "t@example.com", Role::Teacher).await;
        let student = seeded(&f, "s@example.com", Role::Student).await;
        let class = open_class(&f, &owner, "Algebra").await;
        let delete = DeleteClass::new(f.classes.clone());

        assert_eq!(
            delete.execute(&student, class.id.clone()).await.unwrap(),
            Err(UseCaseError::Unauthorized)
        );
        delete.execute(&owner, class.id.clone()).await.unwrap().unwrap();
        assert_eq!(
            delete.execute(&owner, class.id).await.unwrap(),
            Err(UseCaseError::NotFound)
        );
    }
}
