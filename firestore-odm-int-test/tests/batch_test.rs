use firestore_odm::common::Value;
use firestore_odm::errors::ErrorKind;
use firestore_odm::model::{DocumentInstance, DocumentMeta, DocumentState};
use firestore_odm::repository::{BatchKind, BatchOperation};
use firestore_odm_int_test::models::{Post, Role, Setting, User};
use firestore_odm_int_test::test_util::{cleanup, create_test_context, run_test};

#[tokio::test]
async fn test_mixed_batch_commits_atomically() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let users = db.repository::<User>()?;
            let mut alice = User::new("Alice", 30);
            alice.id = Some("alice".to_string());
            let mut bob = User::new("Bob", 25);
            bob.id = Some("bob".to_string());
            users.save(&mut alice).await?;
            users.save(&mut bob).await?;

            let mut post = Post::new("Batched");
            post.meta = DocumentMeta::with_parent_path("users/alice");
            let mut theme = Setting {
                key: Some("theme".to_string()),
                value: "dark".to_string(),
            };
            alice.name = "Alice B.".to_string();

            let writes = ctx.store().write_count();
            db.batch_write(vec![
                BatchOperation::create(&mut post),
                BatchOperation::create(&mut theme),
                BatchOperation::update(&mut alice),
                BatchOperation::delete(&mut bob),
            ])
            .await?;
            assert_eq!(ctx.store().write_count() - writes, 1);

            let post_id = post.id.clone().unwrap();
            assert_eq!(post.meta.parent_path(), Some("users/alice"));
            let raw_post = ctx
                .store()
                .get_raw(&format!("users/alice/posts/{}", post_id))
                .unwrap();
            assert_eq!(raw_post.get("title"), Some(&Value::from("Batched")));

            assert!(ctx.store().get_raw("Setting/theme").is_some());
            assert_eq!(
                ctx.store().get_raw("users/alice").unwrap().get("name"),
                Some(&Value::from("Alice B."))
            );
            assert!(ctx.store().get_raw("users/bob").is_none());
            assert_eq!(bob.state(), DocumentState::Deleted);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_batch_update_writes_values_reset_to_default() {
    run_test(
        create_test_context,
        |ctx| async move {
            let users = ctx.db().repository::<User>()?;
            let mut alice = User::new("Alice", 40);
            alice.id = Some("alice".to_string());
            alice.role = Role::Admin;
            users.save(&mut alice).await?;

            alice.age = 0;
            alice.role = Role::Member;
            ctx.db()
                .batch_write(vec![BatchOperation::update(&mut alice)])
                .await?;

            let raw = ctx.store().get_raw("users/alice").unwrap();
            assert_eq!(raw.get("age"), Some(&Value::from(0)));
            assert_eq!(raw.get("role"), Some(&Value::from("Member")));
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_failed_batch_changes_nothing() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let users = db.repository::<User>()?;
            let mut alice = User::new("Alice", 30);
            alice.id = Some("alice".to_string());
            users.save(&mut alice).await?;

            let mut fresh = User::new("Fresh", 20);
            let mut ghost = User::new("Ghost", 40);
            ghost.id = Some("ghost".to_string());

            let err = db
                .batch_write(vec![
                    BatchOperation::create(&mut fresh),
                    BatchOperation::delete(&mut alice),
                    BatchOperation::update(&mut ghost),
                ])
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);

            assert!(fresh.id.is_none());
            assert_eq!(alice.state(), DocumentState::Persisted);
            assert_eq!(ctx.store().document_count(), 1);
            assert!(ctx.store().get_raw("users/alice").is_some());
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_invalid_operation_stops_staging() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let mut orphan = Post::new("No parent");
            let mut user = User::new("Alice", 30);
            let err = db
                .batch_write(vec![
                    BatchOperation::create(&mut user),
                    BatchOperation::create(&mut orphan),
                ])
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnresolvedParent);
            assert!(user.id.is_none());
            assert_eq!(ctx.store().write_count(), 0);

            let mut unsaved = User::new("Bob", 25);
            let err = db
                .batch_write(vec![BatchOperation::delete(&mut unsaved)])
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MissingIdentifier);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_batch_size_limit() {
    run_test(
        create_test_context,
        |ctx| async move {
            let mut users: Vec<User> = (0..501).map(|i| User::new(&format!("user {}", i), 20)).collect();
            let operations = users
                .iter_mut()
                .map(|user| BatchOperation::create(user))
                .collect::<Vec<_>>();
            let err = ctx.db().batch_write(operations).await.unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ctx.store().document_count(), 0);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    run_test(
        create_test_context,
        |ctx| async move {
            ctx.db().batch_write(Vec::new()).await?;
            assert_eq!(ctx.store().write_count(), 0);

            let op_kind = {
                let mut user = User::new("Alice", 30);
                BatchOperation::create(&mut user).kind()
            };
            assert_eq!(op_kind, BatchKind::Create);
            Ok(())
        },
        cleanup,
    )
    .await
}
