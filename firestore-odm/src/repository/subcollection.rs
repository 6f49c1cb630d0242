use crate::collection::FindOptions;
use crate::database::Database;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::filter::FieldFilter;
use crate::model::{DocumentInstance, DocumentModel};
use crate::repository::{ModelStream, Repository};
use std::fmt::{Debug, Formatter};

/// The `C` documents under one parent document.
///
/// Obtained from [`Database::subcollection`]. Every call goes to the collection of
/// `C` under the bound parent, whatever parent path the passed instances cache.
///
/// ```rust,ignore
/// let posts = db.subcollection::<Post>(&alice)?;
/// let mut post = Post { title: "Hello".into(), ..Default::default() };
/// posts.add(&mut post).await?;
/// assert_eq!(posts.count(&[]).await?, 1);
/// ```
pub struct Subcollection<C: DocumentModel> {
    repository: Repository<C>,
}

impl<C: DocumentModel> Clone for Subcollection<C> {
    fn clone(&self) -> Self {
        Subcollection {
            repository: self.repository.clone(),
        }
    }
}

impl<C: DocumentModel> Debug for Subcollection<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subcollection")
            .field("model", &C::descriptor().model_name())
            .field("parent", &self.parent_path())
            .finish()
    }
}

impl<C: DocumentModel> Subcollection<C> {
    pub(crate) fn bind(db: &Database, parent: &dyn DocumentInstance) -> OdmResult<Self> {
        let child = C::descriptor();
        let parent_type = parent.model_descriptor();
        if child.parent() != Some(parent_type) {
            log::error!(
                "{} is not a subcollection of {}",
                child.model_name(),
                parent_type.model_name()
            );
            return Err(OdmError::new(
                &format!(
                    "{} is not a subcollection of {}",
                    child.model_name(),
                    parent_type.model_name()
                ),
                ErrorKind::InvalidAccessorBinding,
            ));
        }

        let repository = db.repository::<C>()?.with_parent(parent)?;
        Ok(Subcollection { repository })
    }

    /// Full path of the bound parent document.
    pub fn parent_path(&self) -> &str {
        // a bound accessor is always scoped
        self.repository
            .parent()
            .map(|parent| parent.document_path())
            .unwrap_or_default()
    }

    pub fn collection_path(&self) -> OdmResult<String> {
        self.repository.collection_path()
    }

    /// The underlying repository, scoped to the parent.
    pub fn repository(&self) -> &Repository<C> {
        &self.repository
    }

    pub async fn add(&self, instance: &mut C) -> OdmResult<()> {
        self.repository.save(instance).await
    }

    pub async fn get(&self, id: &str) -> OdmResult<Option<C>> {
        self.repository.get(id).await
    }

    pub fn find(&self, filters: &[FieldFilter], options: &FindOptions) -> OdmResult<ModelStream<C>> {
        self.repository.find_with_options(filters, options)
    }

    pub async fn find_one(&self, filters: &[FieldFilter]) -> OdmResult<Option<C>> {
        self.repository.find_one(filters).await
    }

    pub async fn count(&self, filters: &[FieldFilter]) -> OdmResult<u64> {
        self.repository.count(filters).await
    }

    pub async fn exists(&self, id: &str) -> OdmResult<bool> {
        self.repository.exists(id).await
    }

    pub async fn delete(&self, instance: &mut C) -> OdmResult<()> {
        self.repository.delete(instance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_models::{Post, User};
    use crate::store::memory::InMemoryStore;

    fn database() -> Database {
        Database::builder()
            .client(InMemoryStore::default())
            .register::<User>()
            .register::<Post>()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn accessor_is_bound_to_parent() {
        let db = database();
        let users = db.repository::<User>().unwrap();
        let mut alice = User::new("Alice", 30);
        let mut bob = User::new("Bob", 25);
        users.save(&mut alice).await.unwrap();
        users.save(&mut bob).await.unwrap();

        let alice_posts = db.subcollection::<Post>(&alice).unwrap();
        let bob_posts = db.subcollection::<Post>(&bob).unwrap();
        assert_eq!(alice_posts.parent_path(), format!("users/{}", alice.id.as_deref().unwrap()));

        let mut post = Post::new("Hello");
        alice_posts.add(&mut post).await.unwrap();
        let id = post.id.clone().unwrap();

        assert!(alice_posts.exists(&id).await.unwrap());
        assert!(!bob_posts.exists(&id).await.unwrap());
        assert_eq!(alice_posts.count(&[]).await.unwrap(), 1);
        assert_eq!(bob_posts.count(&[]).await.unwrap(), 0);
        assert!(bob_posts.find_one(&[]).await.unwrap().is_none());

        let loaded = alice_posts.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Hello");
        assert_eq!(
            format!("{:?}", alice_posts),
            format!(
                "Subcollection {{ model: \"Post\", parent: \"users/{}\" }}",
                alice.id.as_deref().unwrap()
            )
        );

        alice_posts.delete(&mut post).await.unwrap();
        assert!(alice_posts.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_foreign_parent_type() {
        let db = database();
        let users = db.repository::<User>().unwrap();
        let mut alice = User::new("Alice", 30);
        users.save(&mut alice).await.unwrap();

        let err = db.subcollection::<User>(&alice).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidAccessorBinding);
    }

    #[test]
    fn unsaved_parent_has_no_path() {
        let db = database();
        let err = db.subcollection::<Post>(&User::new("Alice", 30)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingIdentifier);
    }
}
