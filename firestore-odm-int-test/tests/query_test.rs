use firestore_odm::collection::{limit_to, order_by, skip_by, FindOptions};
use firestore_odm::common::SortOrder;
use firestore_odm::errors::{ErrorKind, OdmResult};
use firestore_odm::filter::{field, FieldRef};
use firestore_odm::repository::Repository;
use firestore_odm_int_test::models::{Role, User, UserSummary};
use firestore_odm_int_test::test_util::{cleanup, create_test_context, run_test};
use futures::TryStreamExt;

async fn seed(users: &Repository<User>) -> OdmResult<()> {
    let people = [
        ("Alice", 30, Role::Admin, vec!["admin", "early"]),
        ("Bob", 25, Role::Member, vec!["early"]),
        ("Carol", 35, Role::Moderator, vec!["mod"]),
        ("Dave", 20, Role::Member, vec![]),
        ("Eve", 30, Role::Member, vec!["late"]),
    ];
    for (name, age, role, tags) in people {
        let mut user = User::new(name, age);
        user.role = role;
        user.email = Some(format!("{}@example.com", name.to_lowercase()));
        user.tags = tags.into_iter().map(String::from).collect();
        users.save(&mut user).await?;
    }
    Ok(())
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

#[tokio::test]
async fn test_equality_and_range_filters() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let thirty = users
                .find_with_options(&[User::FIELDS.age.eq(30)], &order_by(User::FIELDS.name, SortOrder::Ascending))?
                .try_collect_all()
                .await?;
            assert_eq!(names(&thirty), vec!["Alice", "Eve"]);

            let adults = users
                .find(&[User::FIELDS.age.gte(25), User::FIELDS.age.lt(35)])?
                .try_collect_all()
                .await?;
            // an inequality without ordering sorts by the filtered field
            assert_eq!(adults.iter().map(|u| u.age).collect::<Vec<_>>(), vec![25, 30, 30]);

            let members = users
                .find(&[User::FIELDS.role.eq("Member"), User::FIELDS.age.gt(20)])?
                .try_collect_all()
                .await?;
            assert_eq!(names(&members), vec!["Bob", "Eve"]);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_list_and_array_filters() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let by_name = order_by(User::FIELDS.name, SortOrder::Ascending);
            let picked = users
                .find_with_options(&[User::FIELDS.name.is_in(vec!["Carol", "Dave", "Zed"])], &by_name)?
                .try_collect_all()
                .await?;
            assert_eq!(names(&picked), vec!["Carol", "Dave"]);

            let early = users
                .find_with_options(&[User::FIELDS.tags.array_contains("early")], &by_name)?
                .try_collect_all()
                .await?;
            assert_eq!(names(&early), vec!["Alice", "Bob"]);

            let tagged = users
                .find_with_options(&[User::FIELDS.tags.array_contains_any(vec!["mod", "late"])], &by_name)?
                .try_collect_all()
                .await?;
            assert_eq!(names(&tagged), vec!["Carol", "Eve"]);

            let err = users
                .find(&[User::FIELDS.name.is_in(Vec::<String>::new())])
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::FilterError);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_aliased_field_filters_on_wire_name() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            assert_eq!(User::FIELDS.email.name(), "emailAddress");
            let bob = users
                .find_one(&[User::FIELDS.email.eq("bob@example.com")])
                .await?
                .unwrap();
            assert_eq!(bob.name, "Bob");

            // the declared name is not what is stored
            assert!(users
                .find_one(&[field("email").eq("bob@example.com")])
                .await?
                .is_none());
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_ordering_and_pagination() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let options = order_by(User::FIELDS.age, SortOrder::Descending).then_by(User::FIELDS.name);
            let all = users.find_with_options(&[], &options)?.try_collect_all().await?;
            assert_eq!(names(&all), vec!["Carol", "Alice", "Eve", "Bob", "Dave"]);

            let page = users
                .find_with_options(&[], &options.clone().offset(1).limit(2))?
                .try_collect_all()
                .await?;
            assert_eq!(names(&page), vec!["Alice", "Eve"]);

            let tail = users
                .find_with_options(&[], &options.clone().offset(4).limit(10))?
                .try_collect_all()
                .await?;
            assert_eq!(names(&tail), vec!["Dave"]);

            let past_end = users
                .find_with_options(&[], &options.offset(10))?
                .try_collect_all()
                .await?;
            assert!(past_end.is_empty());

            let two = users.find_with_options(&[], &limit_to(2))?.try_collect_all().await?;
            assert_eq!(two.len(), 2);
            let skipped = users.find_with_options(&[], &skip_by(3))?.try_collect_all().await?;
            assert_eq!(skipped.len(), 2);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_find_one_with_ordering() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let youngest = users
                .find_one_with_options(&[], &FindOptions::new().order_by(User::FIELDS.age.asc()))
                .await?
                .unwrap();
            assert_eq!(youngest.name, "Dave");

            let oldest = users
                .find_one_with_options(&[], &FindOptions::new().order_by(User::FIELDS.age.desc()))
                .await?
                .unwrap();
            assert_eq!(oldest.name, "Carol");

            assert!(users.find_one(&[User::FIELDS.age.gt(100)]).await?.is_none());
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_document_id_filter() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            let mut alice = User::new("Alice", 30);
            alice.id = Some("alice".to_string());
            let mut bob = User::new("Bob", 25);
            bob.id = Some("bob".to_string());
            users.save(&mut alice).await?;
            users.save(&mut bob).await?;

            let found = users.find_one(&[User::FIELDS.id.eq("bob")]).await?.unwrap();
            assert_eq!(found.id.as_deref(), Some("bob"));
            assert_eq!(found.name, "Bob");

            let by_key = users
                .find_with_options(&[], &order_by(FieldRef::document_id(), SortOrder::Descending))?
                .try_collect_all()
                .await?;
            assert_eq!(names(&by_key), vec!["Bob", "Alice"]);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_projection() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let summaries: Vec<UserSummary> = users
                .find_as::<UserSummary>(&[User::FIELDS.age.gte(30)], &order_by(User::FIELDS.name, SortOrder::Ascending))?
                .try_collect_all()
                .await?;
            assert_eq!(summaries.len(), 3);
            assert_eq!(summaries[0].name, "Alice");
            assert_eq!(summaries[0].email.as_deref(), Some("alice@example.com"));
            assert!(summaries.iter().all(|s| s.id.is_some()));

            let one = users
                .find_one_as::<UserSummary>(&[User::FIELDS.name.eq("Bob")], &FindOptions::new())
                .await?
                .unwrap();
            assert_eq!(one.email.as_deref(), Some("bob@example.com"));
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_count() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            assert_eq!(users.count(&[]).await?, 0);
            seed(&users).await?;

            assert_eq!(users.count(&[]).await?, 5);
            assert_eq!(users.count(&[User::FIELDS.age.eq(30)]).await?, 2);
            assert_eq!(users.count(&[User::FIELDS.age.gt(100)]).await?, 0);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_streaming_results() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            seed(&users).await?;

            let mut stream = users.find_with_options(&[], &order_by(User::FIELDS.name, SortOrder::Ascending))?;
            let mut seen = Vec::new();
            while let Some(user) = stream.try_next().await? {
                seen.push(user.name);
            }
            assert_eq!(seen, vec!["Alice", "Bob", "Carol", "Dave", "Eve"]);
            Ok(())
        },
        cleanup,
    )
    .await
}
