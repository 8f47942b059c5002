//! End-to-end flows through the composition root

use campus_core::prelude::*;

async fn campus() -> Campus {
    Campus::connect(&Config::default()).await.unwrap()
}

fn new_user(name: &str, email: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

/// Register a user through the use case and act as them
async fn register(campus: &Campus, admin: &Executor, email: &str, role: Role) -> Executor {
    let user = campus
        .register_user()
        .execute(admin, new_user("Member", email, role))
        .await
        .unwrap()
        .unwrap();
    Executor::new(user.id, user.role)
}

/// The first admin has to come from the repository directly
async fn bootstrap_admin(campus: &Campus) -> Executor {
    let admin = campus
        .users()
        .add(new_user("Root", "root@example.com", Role::Admin))
        .await
        .unwrap();
    Executor::new(admin.id, admin.role)
}

#[tokio::test]
async fn test_tag_scenario() {
    let campus = campus().await;
    let teacher = Executor::new(UserId::new(), Role::Teacher);

    let tag = campus
        .create_tag()
        .execute(&teacher, NewTag::new("Test Tag"))
        .await
        .unwrap()
        .unwrap();

    let page = campus
        .search_tags()
        .execute(&teacher, TagCriteria::all().with_text(StringQuery::eq("Test Tag")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.results(), [tag]);
    assert_eq!(page.total_pages(), 1);

    let page = campus
        .search_tags()
        .execute(&teacher, TagCriteria::all().with_text(StringQuery::eq("Nonexistent")))
        .await
        .unwrap()
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_pages(), 0);
}

#[tokio::test]
async fn test_unauthorized_beats_invalid_input() {
    let campus = campus().await;
    let student = Executor::new(UserId::new(), Role::Student);

    let tag = campus.create_tag().execute(&student, NewTag::new("")).await.unwrap();
    assert_eq!(tag, Err(UseCaseError::Unauthorized));

    let user = campus
        .register_user()
        .execute(&student, new_user("", "not-an-email", Role::Admin))
        .await
        .unwrap();
    assert_eq!(user, Err(UseCaseError::Unauthorized));

    let class = campus
        .create_class()
        .execute(&student, ClassDraft::new(""))
        .await
        .unwrap();
    assert_eq!(class, Err(UseCaseError::Unauthorized));
}

#[tokio::test]
async fn test_invalid_input_lists_every_field() {
    let campus = campus().await;
    let admin = bootstrap_admin(&campus).await;

    let outcome = campus
        .register_user()
        .execute(&admin, new_user("   ", "nobody", Role::Student))
        .await
        .unwrap();
    let Err(UseCaseError::InputError { fields }) = outcome else {
        panic!("expected input error, got {outcome:?}");
    };
    let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(names, ["email", "name"]);
}

#[tokio::test]
async fn test_class_lifecycle() {
    let campus = campus().await;
    let admin = bootstrap_admin(&campus).await;
    let teacher = register(&campus, &admin, "teacher@example.com", Role::Teacher).await;
    let student = register(&campus, &admin, "student@example.com", Role::Student).await;

    let class = campus
        .create_class()
        .execute(&teacher, ClassDraft::new("Systems Programming").describe("Rust from scratch"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(class.owner_id, teacher.id);

    // Only the owner or an admin may enroll
    let enrollment = NewMembership::new(class.id.clone(), student.id.clone());
    assert_eq!(
        campus.enroll_member().execute(&student, enrollment.clone()).await.unwrap(),
        Err(UseCaseError::Unauthorized)
    );
    let membership = campus
        .enroll_member()
        .execute(&teacher, enrollment.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.user_id, student.id);
    assert!(matches!(
        campus.enroll_member().execute(&admin, enrollment).await.unwrap(),
        Err(UseCaseError::Conflict { .. })
    ));

    let enrolled = ClassCriteria {
        member_id: Some(student.id.clone()),
        ..ClassCriteria::all()
    };
    let page = campus
        .search_classes()
        .execute(&student, enrolled.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.results(), [class.clone()]);

    // Students cannot edit someone else's class
    let rename = ClassUpdate::new(class.id.clone()).name("Advanced Systems");
    assert_eq!(
        campus.update_class().execute(&student, rename.clone()).await.unwrap(),
        Err(UseCaseError::Unauthorized)
    );
    let renamed = campus
        .update_class()
        .execute(&teacher, rename)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Advanced Systems");
    assert_eq!(renamed.description.as_deref(), Some("Rust from scratch"));

    // The owner cannot be deleted while the class exists
    assert_eq!(
        campus.delete_user().execute(&admin, teacher.id.clone()).await.unwrap(),
        Err(UseCaseError::conflict("user still owns classes"))
    );

    campus
        .delete_class()
        .execute(&admin, class.id.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        campus.get_class().execute(&student, class.id.clone()).await.unwrap(),
        Err(UseCaseError::NotFound)
    );
    let page = campus
        .search_classes()
        .execute(&student, enrolled)
        .await
        .unwrap()
        .unwrap();
    assert!(page.is_empty());

    campus
        .delete_user()
        .execute(&admin, teacher.id)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_missing_target_is_not_found_before_ownership() {
    let campus = campus().await;
    let student = Executor::new(UserId::new(), Role::Student);

    assert_eq!(
        campus
            .update_class()
            .execute(&student, ClassUpdate::new(ClassId::new()).name("x"))
            .await
            .unwrap(),
        Err(UseCaseError::NotFound)
    );
    assert_eq!(
        campus.delete_class().execute(&student, ClassId::new()).await.unwrap(),
        Err(UseCaseError::NotFound)
    );
    assert_eq!(
        campus
            .enroll_member()
            .execute(&student, NewMembership::new(ClassId::new(), student.id.clone()))
            .await
            .unwrap(),
        Err(UseCaseError::NotFound)
    );
}

#[tokio::test]
async fn test_questions_per_test() {
    let campus = campus().await;
    let teacher = Executor::new(UserId::new(), Role::Teacher);
    let midterm = TestId::new();
    let final_exam = TestId::new();

    let bodies = [
        QuestionBody::OpenText {
            prompt: "Explain borrowing".to_string(),
        },
        QuestionBody::MultipleChoice {
            prompt: "Which type is Copy?".to_string(),
            choices: vec!["String".to_string(), "u32".to_string(), "Vec<u8>".to_string()],
            answer: 1,
        },
        QuestionBody::TrueFalse {
            statement: "Box<T> is heap allocated".to_string(),
            answer: true,
        },
    ];
    for (position, body) in (1..).zip(bodies.iter().cloned()) {
        campus
            .add_question()
            .execute(
                &teacher,
                QuestionDraft {
                    test_id: midterm.clone(),
                    position,
                    body,
                },
            )
            .await
            .unwrap()
            .unwrap();
    }

    let page = campus
        .list_questions()
        .execute(&teacher, QuestionCriteria::for_test(midterm))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.total(), 3);
    let mut decoded: Vec<_> = page
        .results()
        .iter()
        .map(|q| (q.position, q.body().unwrap()))
        .collect();
    decoded.sort_by_key(|(position, _)| *position);
    let decoded: Vec<_> = decoded.into_iter().map(|(_, body)| body).collect();
    assert_eq!(decoded, bodies);

    let page = campus
        .list_questions()
        .execute(&teacher, QuestionCriteria::for_test(final_exam))
        .await
        .unwrap()
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_outcomes_serialize_for_callers() {
    let campus = campus().await;
    let student = Executor::new(UserId::new(), Role::Student);
    let outcome = campus
        .delete_tag()
        .execute(&student, TagId::new())
        .await
        .unwrap()
        .unwrap_err();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["error"], "unauthorized");
}
