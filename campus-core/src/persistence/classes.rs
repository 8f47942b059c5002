use chrono::Utc;

use crate::domain::{Class, ClassCriteria, ClassUpdate, NewClass};
use crate::ids::{ClassId, UserId};
use crate::repository::{
    Creator, Criteria, Deleter, FilterCondition, PageSize, PaginatedQuery, Querier, Reader,
    RepositoryError, RepositoryOperation, RepositoryResult, Updater,
};

use super::database::{ClassRow, Database};
use super::{db_error, sql};

/// Classes and their owner
///
/// Membership filters are resolved through the `class_members` relation
/// table. Deleting a class drops its memberships.
#[derive(Clone)]
pub struct ClassRepository {
    db: Database,
    page_size: PageSize,
}

impl ClassRepository {
    pub fn new(db: Database, page_size: PageSize) -> Self {
        Self { db, page_size }
    }
}

impl Creator<Class, NewClass> for ClassRepository {
    async fn add(&self, input: NewClass) -> RepositoryResult<Class> {
        let op = RepositoryOperation::Create;
        let mut tx = self.db.pool().begin().await.map_err(db_error(op))?;

        let owner_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?)")
                .bind(input.owner_id.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error(op))?;
        if !owner_exists {
            return Err(RepositoryError::not_found("users", input.owner_id.as_str())
                .with_operation(op));
        }

        let id = ClassId::new();
        tracing::debug!(class_id = %id, owner_id = %input.owner_id, "inserting class");
        let row: ClassRow = sqlx::query_as(&format!(
            "INSERT INTO classes (id, name, description, owner_id, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {}",
            ClassRow::COLUMNS
        ))
        .bind(id.as_str())
        .bind(input.name)
        .bind(input.description)
        .bind(input.owner_id.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error(op))?;
        tx.commit().await.map_err(db_error(op))?;
        row.try_into()
    }
}

impl Reader<ClassId, Class> for ClassRepository {
    async fn get(&self, id: &ClassId) -> RepositoryResult<Option<Class>> {
        let row: Option<ClassRow> =
            sqlx::query_as(&format!("SELECT {} FROM classes WHERE id = ?", ClassRow::COLUMNS))
                .bind(id.as_str())
                .fetch_optional(self.db.pool())
                .await
                .map_err(db_error(RepositoryOperation::Get))?;
        row.map(Class::try_from).transpose()
    }
}

impl Updater<Class, ClassUpdate> for ClassRepository {
    async fn update(&self, input: ClassUpdate) -> RepositoryResult<Class> {
        tracing::debug!(class_id = %input.id, "updating class");
        let ClassUpdate {
            id,
            name,
            description,
        } = input;
        // `Some(None)` clears the description
        let row: Option<ClassRow> = sqlx::query_as(&format!(
            "UPDATE classes SET name = COALESCE(?, name), \
             description = CASE WHEN ? THEN ? ELSE description END \
             WHERE id = ? RETURNING {}",
            ClassRow::COLUMNS
        ))
        .bind(name)
        .bind(description.is_some())
        .bind(description.flatten())
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Update))?;
        row.ok_or_else(|| {
            RepositoryError::not_found("classes", id.as_str())
                .with_operation(RepositoryOperation::Update)
        })?
        .try_into()
    }
}

impl Deleter<ClassId, Class> for ClassRepository {
    async fn delete(&self, id: &ClassId) -> RepositoryResult<Class> {
        // memberships follow through ON DELETE CASCADE
        let row: Option<ClassRow> = sqlx::query_as(&format!(
            "DELETE FROM classes WHERE id = ? RETURNING {}",
            ClassRow::COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_error(RepositoryOperation::Delete))?;
        let row = row.ok_or_else(|| {
            RepositoryError::not_found("classes", id.as_str())
                .with_operation(RepositoryOperation::Delete)
        })?;
        tracing::debug!(class_id = %id, "class deleted");
        row.try_into()
    }
}

impl Querier<Class, ClassCriteria> for ClassRepository {
    async fn get_by(
        &self,
        criteria: ClassCriteria,
    ) -> RepositoryResult<PaginatedQuery<Class, ClassCriteria>> {
        let mut filters = Vec::new();
        if let Some(name) = &criteria.name {
            filters.push(name.to_filter("name"));
        }
        if let Some(owner) = &criteria.owner_id {
            filters.push(FilterCondition::eq("owner_id", owner.as_str()));
        }

        let window = self.page_size.window(criteria.page());
        let mut tx = self.db.pool().begin().await?;
        if let Some(member) = &criteria.member_id {
            let class_ids = classes_with_member(&mut tx, member).await?;
            filters.push(FilterCondition::in_strings("id", class_ids));
        }
        let (total, rows): (u64, Vec<ClassRow>) =
            sql::select_page(&mut tx, "classes", ClassRow::COLUMNS, &filters, window).await?;
        tx.commit().await?;
        tracing::debug!(total, filters = filters.len(), "class query");

        let results = rows.into_iter().map(Class::try_from).collect::<RepositoryResult<_>>()?;
        Ok(PaginatedQuery::new(criteria, self.page_size, total, results))
    }
}

async fn classes_with_member(
    conn: &mut sqlx::SqliteConnection,
    member: &UserId,
) -> RepositoryResult<Vec<String>> {
    let ids = sqlx::query_scalar("SELECT class_id FROM class_members WHERE user_id = ?")
        .bind(member.as_str())
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MembershipKey, NewUser, Role};
    use crate::persistence::{MembershipRepository, UserRepository};
    use crate::repository::{StorageErrorClass, StringQuery};

    struct Fixture {
        db: Database,
        users: UserRepository,
        classes: ClassRepository,
        members: MembershipRepository,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        Fixture {
            users: UserRepository::new(db.clone(), PageSize::DEFAULT),
            classes: ClassRepository::new(db.clone(), PageSize::DEFAULT),
            members: MembershipRepository::new(db.clone()),
            db,
        }
    }

    async fn user(f: &Fixture, email: &str) -> UserId {
        f.users
            .add(NewUser {
                name: "Someone".to_string(),
                email: email.to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap()
            .id
    }

    fn class(name: &str, owner: &UserId) -> NewClass {
        NewClass {
            name: name.to_string(),
            description: None,
            owner_id: owner.clone(),
        }
    }

    #[tokio::test]
    async fn test_owner_must_exist() {
        let f = fixture().await;
        let err = f.classes.add(class("Algebra", &UserId::new())).await.unwrap_err();
        assert_eq!(err.classify(), StorageErrorClass::NotFound);
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let f = fixture().await;
        let owner = user(&f, "ada@example.com").await;
        let mut input = class("Algebra", &owner);
        input.description = Some("Linear".to_string());
        let created = f.classes.add(input).await.unwrap();

        let updated = f
            .classes
            .update(ClassUpdate::new(created.id.clone()).name("Algebra II"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Algebra II");
        assert_eq!(updated.description.as_deref(), Some("Linear"));
        assert_eq!(updated.owner_id, owner);
    }

    #[tokio::test]
    async fn test_member_filter_goes_through_relation() {
        let f = fixture().await;
        let owner = user(&f, "ada@example.com").await;
        let student = user(&f, "bob@example.com").await;
        let algebra = f.classes.add(class("Algebra", &owner)).await.unwrap();
        f.classes.add(class("Biology", &owner)).await.unwrap();
        f.members
            .add(MembershipKey::new(algebra.id.clone(), student.clone()))
            .await
            .unwrap();

        let criteria = ClassCriteria {
            member_id: Some(student.clone()),
            ..ClassCriteria::all()
        };
        let page = f.classes.get_by(criteria).await.unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(page.results()[0].id, algebra.id);

        let nobody = ClassCriteria {
            member_id: Some(UserId::new()),
            ..ClassCriteria::all()
        };
        assert!(f.classes.get_by(nobody).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_criteria_fields_are_anded() {
        let f = fixture().await;
        let ada = user(&f, "ada@example.com").await;
        let grace = user(&f, "grace@example.com").await;
        f.classes.add(class("Algebra", &ada)).await.unwrap();
        f.classes.add(class("Algorithms", &grace)).await.unwrap();

        let by_name = ClassCriteria {
            name: Some(StringQuery::contains("Alg")),
            ..ClassCriteria::all()
        };
        assert_eq!(f.classes.get_by(by_name.clone()).await.unwrap().total(), 2);

        let by_name_and_owner = ClassCriteria {
            owner_id: Some(grace),
            ..by_name
        };
        let page = f.classes.get_by(by_name_and_owner).await.unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(page.results()[0].name, "Algorithms");
    }

    #[tokio::test]
    async fn test_delete_drops_memberships() {
        let f = fixture().await;
        let owner = user(&f, "ada@example.com").await;
        let student = user(&f, "bob@example.com").await;
        let algebra = f.classes.add(class("Algebra", &owner)).await.unwrap();
        let key = MembershipKey::new(algebra.id.clone(), student);
        f.members.add(key.clone()).await.unwrap();

        f.classes.delete(&algebra.id).await.unwrap();
        assert_eq!(f.members.get(&key).await.unwrap(), None);
        assert_eq!(
            f.classes.delete(&algebra.id).await.unwrap_err().classify(),
            StorageErrorClass::NotFound
        );
    }

    #[tokio::test]
    async fn test_description_can_be_cleared() {
        let f = fixture().await;
        let owner = user(&f, "ada@example.com").await;
        let mut input = class("Algebra", &owner);
        input.description = Some("Linear".to_string());
        let created = f.classes.add(input).await.unwrap();

        let kept = f
            .classes
            .update(ClassUpdate::new(created.id.clone()).name("Algebra I"))
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("Linear"));

        let cleared = f
            .classes
            .update(ClassUpdate::new(created.id.clone()).clear_description())
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Algebra I");
        assert_eq!(f.classes.get(&created.id).await.unwrap(), Some(cleared));
    }

    async fn owned_by(f: &Fixture, owner: &UserId) -> u64 {
        let criteria = ClassCriteria {
            owner_id: Some(owner.clone()),
            ..ClassCriteria::all()
        };
        f.classes.get_by(criteria).await.unwrap().total()
    }

    #[tokio::test]
    async fn test_insert_after_owner_delete_is_refused() {
        let f = fixture().await;
        let owner = user(&f, "ada@example.com").await;
        f.users.delete(&owner).await.unwrap();

        // the write an earlier existence check would have let through
        let err = sqlx::query(
            "INSERT INTO classes (id, name, owner_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(ClassId::new().as_str())
        .bind("Orphan")
        .bind(owner.as_str())
        .bind(Utc::now())
        .execute(f.db.pool())
        .await
        .unwrap_err();
        assert_eq!(
            RepositoryError::from(err).kind,
            crate::repository::RepositoryErrorKind::ConstraintViolation
        );

        let err = f.classes.add(class("Orphan", &owner)).await.unwrap_err();
        assert_eq!(err.classify(), StorageErrorClass::NotFound);
        assert_eq!(owned_by(&f, &owner).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_owner_delete_never_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("race.db").display()),
            max_connections: 4,
            ..crate::config::DatabaseConfig::default()
        };
        let db = Database::connect(&config).await.unwrap();
        let f = Fixture {
            users: UserRepository::new(db.clone(), PageSize::DEFAULT),
            classes: ClassRepository::new(db.clone(), PageSize::DEFAULT),
            members: MembershipRepository::new(db.clone()),
            db,
        };

        for round in 0..20 {
            let owner = user(&f, &format!("owner{round}@example.com")).await;
            let adds: Vec<_> = (0..4)
                .map(|i| {
                    let classes = f.classes.clone();
                    let input = class(&format!("Class {i}"), &owner);
                    tokio::spawn(async move { classes.add(input).await })
                })
                .collect();
            let deleted = f.users.delete(&owner).await;
            for add in adds {
                // losing the race is fine; leaving an orphan is not
                let _ = add.await.unwrap();
            }

            let owner_exists = f.users.get(&owner).await.unwrap().is_some();
            assert_eq!(deleted.is_ok(), !owner_exists, "round {round}");
            if !owner_exists {
                assert_eq!(owned_by(&f, &owner).await, 0, "round {round}");
            }
        }
    }
}
