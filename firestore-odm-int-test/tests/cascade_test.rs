use firestore_odm::database::Database;
use firestore_odm::errors::{ErrorKind, OdmResult};
use firestore_odm::model::{DocumentInstance, DocumentState};
use firestore_odm::store::memory::InMemoryStoreConfig;
use firestore_odm_int_test::models::{Comment, Post, User};
use firestore_odm_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, run_test,
};

/// A user with `posts` posts of `comments` comments each.
async fn seed_user(
    db: &Database,
    id: &str,
    posts: usize,
    comments: usize,
) -> OdmResult<(User, Vec<Post>)> {
    let mut user = User::new(id, 30);
    user.id = Some(id.to_string());
    db.repository::<User>()?.save(&mut user).await?;

    let mut saved_posts = Vec::with_capacity(posts);
    for p in 0..posts {
        let mut post = Post::new(&format!("post {}", p));
        post.id = Some(format!("p{}", p));
        db.subcollection::<Post>(&user)?.add(&mut post).await?;

        let replies = db.subcollection::<Comment>(&post)?;
        for c in 0..comments {
            let mut comment = Comment::new(&format!("comment {}", c));
            comment.id = Some(format!("c{}", c));
            replies.add(&mut comment).await?;
        }
        saved_posts.push(post);
    }
    Ok((user, saved_posts))
}

fn paths_under(paths: &[String], prefix: &str) -> usize {
    paths
        .iter()
        .filter(|path| path.as_str() == prefix || path.starts_with(&format!("{}/", prefix)))
        .count()
}

#[tokio::test]
async fn test_cascade_deletes_whole_subtree() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let (mut alice, _) = seed_user(&db, "alice", 2, 2).await?;
            seed_user(&db, "bob", 1, 1).await?;
            assert_eq!(ctx.store().document_count(), 10);

            let deleted = db.repository::<User>()?.delete_cascade(&mut alice).await?;
            assert_eq!(deleted, 7);
            assert_eq!(alice.state(), DocumentState::Deleted);

            let paths = ctx.store().paths();
            assert_eq!(paths_under(&paths, "users/alice"), 0);
            assert_eq!(paths_under(&paths, "users/bob"), 3);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_cascade_from_middle_of_hierarchy() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let (alice, mut posts) = seed_user(&db, "alice", 2, 3).await?;

            let alice_posts = db.subcollection::<Post>(&alice)?;
            let deleted = alice_posts
                .repository()
                .delete_cascade(&mut posts[0])
                .await?;
            assert_eq!(deleted, 4);

            let paths = ctx.store().paths();
            assert_eq!(paths_under(&paths, "users/alice/posts/p0"), 0);
            assert_eq!(paths_under(&paths, "users/alice/posts/p1"), 4);
            assert!(ctx.store().get_raw("users/alice").is_some());
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_plain_delete_leaves_subcollections() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let (mut alice, _) = seed_user(&db, "alice", 1, 2).await?;

            db.repository::<User>()?.delete(&mut alice).await?;
            let paths = ctx.store().paths();
            assert!(ctx.store().get_raw("users/alice").is_none());
            assert_eq!(paths_under(&paths, "users/alice/posts"), 3);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_cascade_commits_in_chunks() {
    run_test(
        || create_test_context_with(InMemoryStoreConfig::new(), |builder| builder.cascade_batch_size(3)),
        |ctx| async move {
            let db = ctx.db();
            let (mut alice, _) = seed_user(&db, "alice", 2, 2).await?;

            let before = ctx.store().write_count();
            let deleted = db.repository::<User>()?.delete_cascade(&mut alice).await?;
            assert_eq!(deleted, 7);
            assert_eq!(ctx.store().write_count() - before, 3);
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_failed_chunk_keeps_ancestors() {
    // 7 writes to seed, one chunk of two deletes, then the store fails
    run_test(
        || {
            create_test_context_with(InMemoryStoreConfig::new().fail_after_writes(8), |builder| {
                builder.cascade_batch_size(2)
            })
        },
        |ctx| async move {
            let db = ctx.db();
            let (mut alice, _) = seed_user(&db, "alice", 2, 2).await?;

            let err = db
                .repository::<User>()?
                .delete_cascade(&mut alice)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::BackendFailure);
            assert_eq!(alice.state(), DocumentState::Persisted);

            // the committed chunk only held leaves
            let paths = ctx.store().paths();
            assert_eq!(paths_under(&paths, "users/alice"), 5);
            assert!(ctx.store().get_raw("users/alice").is_some());
            assert!(ctx.store().get_raw("users/alice/posts/p0").is_some());
            assert!(ctx.store().get_raw("users/alice/posts/p1").is_some());
            Ok(())
        },
        cleanup,
    )
    .await
}

#[tokio::test]
async fn test_cascade_requires_persisted_instance() {
    run_test(
        create_test_context,
        |ctx| async move {
            let mut unsaved = User::new("Alice", 30);
            let err = ctx
                .db()
                .repository::<User>()?
                .delete_cascade(&mut unsaved)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MissingIdentifier);
            Ok(())
        },
        cleanup,
    )
    .await
}
