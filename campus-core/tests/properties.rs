//! Algebraic laws of the outcome vocabulary and pagination properties

use campus_core::domain::{NewTag, NewUser, Role, TagCriteria, UserCriteria};
use campus_core::outcome::{InvalidState, OptionalExt, ResultExt, Variant};
use campus_core::persistence::{Database, TagRepository, UserRepository};
use campus_core::repository::{
    Creator, Criteria, PageSize, PaginatedQuery, Querier, SearchType, StringQuery,
};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn f(x: i64) -> i64 {
    x.wrapping_mul(3).wrapping_add(1)
}

fn half(x: i64) -> Option<i64> {
    (x % 2 == 0).then_some(x / 2)
}

fn checked_half(x: i64) -> Result<i64, String> {
    half(x).ok_or_else(|| format!("{x} is odd"))
}

proptest! {
    #[test]
    fn optional_map_and_unwrap(x in any::<i64>(), d in any::<i64>()) {
        prop_assert_eq!(Some(x).map(f).unwrap(), f(x));
        prop_assert!(None::<i64>.map(f).is_none());
        prop_assert_eq!(Some(x).unwrap_or(d), x);
        prop_assert_eq!(None.unwrap_or(d), d);
        prop_assert_eq!(Some(x).and_then(half), half(x));
        prop_assert!(None.and_then(half).is_none());
    }

    #[test]
    fn optional_fold_is_total(value in proptest::option::of(any::<i64>())) {
        let folded = value.fold(|x| x.to_string(), || "none".to_string());
        prop_assert_eq!(folded, value.map_or_else(|| "none".to_string(), |x| x.to_string()));
        prop_assert_eq!(value.is_some(), !value.is_none());
        match value.try_unwrap() {
            Ok(x) => prop_assert_eq!(Some(x), value),
            Err(err) => prop_assert_eq!(
                err,
                InvalidState { expected: Variant::Some, found: Variant::None }
            ),
        }
    }

    #[test]
    fn result_laws(x in any::<i64>(), e in ".*") {
        let ok: Result<i64, String> = Ok(x);
        let err: Result<i64, String> = Err(e.clone());

        prop_assert_eq!(ok.clone().map(f).unwrap(), f(x));
        prop_assert_eq!(err.clone().map(f).unwrap_err(), e.clone());
        prop_assert_eq!(ok.clone().and_then(checked_half), checked_half(x));
        prop_assert_eq!(err.clone().and_then(checked_half).unwrap_err(), e.clone());

        prop_assert_eq!(
            ok.clone().try_unwrap_err(),
            Err(InvalidState { expected: Variant::Err, found: Variant::Ok })
        );
        prop_assert_eq!(
            err.clone().try_unwrap(),
            Err(InvalidState { expected: Variant::Ok, found: Variant::Err })
        );
        prop_assert_eq!(ok.fold(|v| v.to_string(), |e| e), x.to_string());
        prop_assert_eq!(err.fold(|v| v.to_string(), |e| e), e);
    }

    #[test]
    fn envelope_page_count_covers_total(total in 0u64..10_000, size in 0u32..200) {
        #[derive(Clone)]
        struct First;
        impl Criteria for First {
            fn page(&self) -> u32 {
                1
            }
        }

        let envelope = PaginatedQuery::<(), _>::new(First, PageSize::new(size), total, vec![]);
        let size = u64::from(envelope.page_size());
        let pages = u64::from(envelope.total_pages());
        prop_assert!(size >= 1);
        prop_assert!(pages * size >= total);
        prop_assert!(pages == 0 || (pages - 1) * size < total);
        prop_assert_eq!(pages == 0, total == 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pages_partition_the_matches(
        texts in proptest::collection::hash_set("[a-c]{1,4}", 0..24),
        size in 1u32..8,
        needle in "[a-c]",
    ) {
        runtime().block_on(async {
            let db = Database::in_memory().await.unwrap();
            let tags = TagRepository::new(db, PageSize::new(size));
            for text in &texts {
                tags.add(NewTag::new(text.clone())).await.unwrap();
            }
            let criteria = TagCriteria::all().with_text(StringQuery::contains(needle.clone()));
            let expected = texts.iter().filter(|t| t.contains(needle.as_str())).count();

            let first = tags.get_by(criteria.clone()).await.unwrap();
            let mut seen = 0;
            for page in 1..=first.total_pages() + 1 {
                let result = tags.get_by(criteria.clone().on_page(page)).await.unwrap();
                prop_assert!(result.len() <= size as usize);
                prop_assert_eq!(result.total(), expected as u64);
                seen += result.len();
            }
            prop_assert_eq!(seen, expected);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn extra_criteria_narrow_results(
        people in proptest::collection::vec(("[ab]{1,3}", 0usize..3), 0..16),
        name in "[ab]",
        role_index in 0usize..3,
    ) {
        const ROLES: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];
        runtime().block_on(async {
            let db = Database::in_memory().await.unwrap();
            let users = UserRepository::new(db, PageSize::new(100));
            for (i, (person, role)) in people.iter().enumerate() {
                users
                    .add(NewUser {
                        name: person.clone(),
                        email: format!("user{i}@example.com"),
                        role: ROLES[*role],
                    })
                    .await
                    .unwrap();
            }

            let broad = UserCriteria {
                name: Some(StringQuery::new(name.clone(), SearchType::StartsWith)),
                ..UserCriteria::all()
            };
            let narrow = UserCriteria {
                role: Some(ROLES[role_index]),
                ..broad.clone()
            };

            let broad = users.get_by(broad).await.unwrap().into_results();
            let narrow = users.get_by(narrow).await.unwrap().into_results();
            prop_assert!(narrow.len() <= broad.len());
            for user in &narrow {
                prop_assert!(broad.contains(user));
                prop_assert_eq!(user.role, ROLES[role_index]);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
