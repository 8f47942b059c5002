//! Composition root
//!
//! [`Campus`] owns the configuration, one [`Database`] pool and a repository
//! per entity sized from `[pagination]`, and hands out ready-made use cases.

use crate::config::Config;
use crate::error::Result;
use crate::observability::init_tracing;
use crate::persistence::{
    ClassRepository, Database, MembershipRepository, QuestionRepository, TagRepository,
    UserRepository,
};
use crate::use_cases::{
    AddQuestion, CreateClass, CreateTag, DeleteClass, DeleteTag, DeleteUser, EnrollMember,
    GetClass, ListQuestions, RegisterUser, SearchClasses, SearchTags, UpdateClass, UpdateUser,
};

/// Application wiring
#[derive(Clone)]
pub struct Campus {
    config: Config,
    db: Database,
    tags: TagRepository,
    users: UserRepository,
    classes: ClassRepository,
    members: MembershipRepository,
    questions: QuestionRepository,
}

impl Campus {
    /// Open the configured database and wire everything over it
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or migrated.
    pub async fn connect(config: &Config) -> Result<Self> {
        let db = Database::connect(&config.database).await?;
        Ok(Self::with_database(config.clone(), db))
    }

    /// Wire everything over an open database
    #[must_use]
    pub fn with_database(config: Config, db: Database) -> Self {
        let pagination = &config.pagination;
        Self {
            tags: TagRepository::new(db.clone(), pagination.tags()),
            users: UserRepository::new(db.clone(), pagination.users()),
            classes: ClassRepository::new(db.clone(), pagination.classes()),
            members: MembershipRepository::new(db.clone()),
            questions: QuestionRepository::new(db.clone(), pagination.questions()),
            db,
            config,
        }
    }

    /// Create a new builder
    #[must_use]
    pub fn builder() -> CampusBuilder {
        CampusBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    #[must_use]
    pub fn tags(&self) -> &TagRepository {
        &self.tags
    }

    #[must_use]
    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    #[must_use]
    pub fn classes(&self) -> &ClassRepository {
        &self.classes
    }

    #[must_use]
    pub fn memberships(&self) -> &MembershipRepository {
        &self.members
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionRepository {
        &self.questions
    }

    pub fn create_tag(&self) -> CreateTag<TagRepository> {
        CreateTag::new(self.tags.clone())
    }

    pub fn search_tags(&self) -> SearchTags<TagRepository> {
        SearchTags::new(self.tags.clone())
    }

    pub fn delete_tag(&self) -> DeleteTag<TagRepository> {
        DeleteTag::new(self.tags.clone())
    }

    pub fn register_user(&self) -> RegisterUser<UserRepository> {
        RegisterUser::new(self.users.clone())
    }

    pub fn update_user(&self) -> UpdateUser<UserRepository> {
        UpdateUser::new(self.users.clone())
    }

    pub fn delete_user(&self) -> DeleteUser<UserRepository, ClassRepository> {
        DeleteUser::new(self.users.clone(), self.classes.clone())
    }

    pub fn create_class(&self) -> CreateClass<ClassRepository> {
        CreateClass::new(self.classes.clone())
    }

    pub fn get_class(&self) -> GetClass<ClassRepository> {
        GetClass::new(self.classes.clone())
    }

    pub fn update_class(&self) -> UpdateClass<ClassRepository> {
        UpdateClass::new(self.classes.clone())
    }

    pub fn delete_class(&self) -> DeleteClass<ClassRepository> {
        DeleteClass::new(self.classes.clone())
    }

    pub fn search_classes(&self) -> SearchClasses<ClassRepository> {
        SearchClasses::new(self.classes.clone())
    }

    pub fn enroll_member(&self) -> EnrollMember<ClassRepository, MembershipRepository> {
        EnrollMember::new(self.classes.clone(), self.members.clone())
    }

    pub fn add_question(&self) -> AddQuestion<QuestionRepository> {
        AddQuestion::new(self.questions.clone())
    }

    pub fn list_questions(&self) -> ListQuestions<QuestionRepository> {
        ListQuestions::new(self.questions.clone())
    }
}

/// Builder for [`Campus`]
///
/// ```rust
/// use campus_core::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<()> {
/// let campus = Campus::builder()
///     .config(Config::default())
///     .without_tracing()
///     .build()
///     .await?;
/// assert_eq!(campus.config().service.name, "campus");
/// # Ok(())
/// # }
/// ```
pub struct CampusBuilder {
    config: Option<Config>,
    db: Option<Database>,
    init_tracing: bool,
}

impl CampusBuilder {
    /// Create a new builder; tracing is initialised on build by default
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            db: None,
            init_tracing: true,
        }
    }

    /// Set the configuration (defaults to [`Config::load`])
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Reuse an open database instead of connecting to `[database]`
    #[must_use]
    pub fn database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// Install the tracing subscriber during build (default)
    #[must_use]
    pub fn with_tracing(mut self) -> Self {
        self.init_tracing = true;
        self
    }

    /// Leave tracing setup to the caller
    #[must_use]
    pub fn without_tracing(mut self) -> Self {
        self.init_tracing = false;
        self
    }

    /// Build the application
    ///
    /// # Errors
    ///
    /// Fails if no configuration was given and loading it fails, or if
    /// the configured database cannot be opened.
    pub async fn build(self) -> Result<Campus> {
        let config = match self.config {
            Some(config) => config,
            None => Config::load()?,
        };
        if self.init_tracing {
            init_tracing(&config)?;
        }
        let db = match self.db {
            Some(db) => db,
            None => Database::connect(&config.database).await?,
        };
        tracing::debug!(service = %config.service.name, "campus wired");
        Ok(Campus::with_database(config, db))
    }
}

impl Default for CampusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::domain::{Executor, NewTag, Role, TagCriteria};
    use crate::ids::UserId;
    use crate::use_cases::UseCase;

    #[tokio::test]
    async fn test_page_sizes_come_from_config() {
        let config = Config {
            pagination: PaginationConfig {
                tags: 2,
                ..PaginationConfig::default()
            },
            ..Config::default()
        };
        let campus = Campus::connect(&config).await.unwrap();
        let admin = Executor::new(UserId::new(), Role::Admin);
        for text in ["a", "b", "c"] {
            campus
                .create_tag()
                .execute(&admin, NewTag::new(text))
                .await
                .unwrap()
                .unwrap();
        }

        let page = campus
            .search_tags()
            .execute(&admin, TagCriteria::all())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.page_size(), 2);
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_shared_database() {
        let db = Database::in_memory().await.unwrap();
        let first = Campus::builder()
            .config(Config::default())
            .database(db.clone())
            .without_tracing()
            .build()
            .await
            .unwrap();
        let second = Campus::with_database(Config::default(), db);

        let admin = Executor::new(UserId::new(), Role::Admin);
        let tag = first
            .create_tag()
            .execute(&admin, NewTag::new("shared"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            crate::repository::Reader::get(second.tags(), &tag.id).await.unwrap(),
            Some(tag)
        );
    }
}
