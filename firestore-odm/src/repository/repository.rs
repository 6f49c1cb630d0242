use crate::collection::FindOptions;
use crate::database::Database;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::filter::FieldFilter;
use crate::model::{
    ensure_live, require_id, resolve_collection, resolve_instance_collection, validate_id,
    DocumentInstance, DocumentModel, ModelDescriptor, ParentRef, ResolvedCollection, Schema,
    SerializeOptions,
};
use crate::query::{Query, QueryBuilder, QueryTarget};
use crate::repository::{cascade_delete, materialize, ModelStream, ParentSource};
use crate::store::StoreClient;
use futures::TryStreamExt;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed access to the documents of one model.
///
/// A repository is either unscoped, in which case subcollection models resolve their
/// collection from the parent path cached on each instance, or scoped to one parent
/// document with [`with_parent`](Repository::with_parent). The scope is the explicit
/// parent of every call and wins over cached paths.
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.repository::<User>()?;
/// let mut alice = User { name: "Alice".into(), ..Default::default() };
/// users.save(&mut alice).await?;
///
/// let posts = db.repository::<Post>()?.with_parent(&alice)?;
/// let recent = posts
///     .find_with_options(&[], &order_by(Post::FIELDS.created, SortOrder::Descending).limit(10))?
///     .try_collect_all()
///     .await?;
/// ```
pub struct Repository<M: DocumentModel> {
    db: Database,
    parent: Option<ParentRef>,
    _phantom: PhantomData<fn() -> M>,
}

impl<M: DocumentModel> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Repository {
            db: self.db.clone(),
            parent: self.parent.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M: DocumentModel> Debug for Repository<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("model", &M::descriptor().model_name())
            .field("parent", &self.parent.as_ref().map(|p| p.document_path()))
            .finish()
    }
}

impl<M: DocumentModel> Repository<M> {
    pub(crate) fn new(db: Database) -> Self {
        Repository {
            db,
            parent: None,
            _phantom: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        M::descriptor()
    }

    /// The parent this repository is scoped to, if any.
    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// A repository scoped to the documents under `parent`.
    ///
    /// # Errors
    ///
    /// `ParentTypeMismatch` if `M` does not declare `parent`'s model as its parent,
    /// `MissingIdentifier` if `parent` has no id.
    pub fn with_parent(&self, parent: &dyn DocumentInstance) -> OdmResult<Repository<M>> {
        let parent = ParentRef::of(parent)?;
        self.scoped(parent)
    }

    /// A repository scoped to the parent document at `parent_path`.
    pub fn with_parent_path(&self, parent_path: &str) -> OdmResult<Repository<M>> {
        let parent_type = match M::descriptor().parent() {
            Some(parent_type) => parent_type,
            None => {
                log::error!("{} is a top-level model", M::descriptor().model_name());
                return Err(OdmError::new(
                    &format!("{} is a top-level model and has no parent", M::descriptor().model_name()),
                    ErrorKind::ParentTypeMismatch,
                ));
            }
        };
        let parent = ParentRef::from_path(parent_type, parent_path)?;
        self.scoped(parent)
    }

    pub(crate) fn scoped(&self, parent: ParentRef) -> OdmResult<Repository<M>> {
        resolve_collection(M::descriptor(), Some(&parent), None)?;
        Ok(Repository {
            db: self.db.clone(),
            parent: Some(parent),
            _phantom: PhantomData,
        })
    }

    /// Collection path of this repository. Fails with `UnresolvedParent` for an
    /// unscoped repository of a subcollection model.
    pub fn collection_path(&self) -> OdmResult<String> {
        Ok(self.resolve()?.collection_path)
    }

    /// Creates the document of `instance`.
    ///
    /// Without an id the store generates one and it is assigned to the instance. With
    /// a caller-supplied id the document must not exist yet, otherwise the call fails
    /// with `AlreadyExists` and nothing is written. On success the resolved parent path
    /// is cached on the instance.
    pub async fn save(&self, instance: &mut M) -> OdmResult<()> {
        self.save_inner(instance, self.parent.as_ref(), &SerializeOptions::for_save())
            .await
    }

    /// Creates the document of `instance` under an explicit `parent`.
    pub async fn save_under(&self, instance: &mut M, parent: &dyn DocumentInstance) -> OdmResult<()> {
        let parent = ParentRef::of(parent)?;
        self.save_inner(instance, Some(&parent), &SerializeOptions::for_save())
            .await
    }

    pub async fn save_with_options(
        &self,
        instance: &mut M,
        options: &SerializeOptions,
    ) -> OdmResult<()> {
        self.save_inner(instance, self.parent.as_ref(), options).await
    }

    async fn save_inner(
        &self,
        instance: &mut M,
        parent: Option<&ParentRef>,
        options: &SerializeOptions,
    ) -> OdmResult<()> {
        let client = self.client()?;
        ensure_live(&*instance)?;
        let resolved = resolve_instance_collection(&*instance, parent)?;

        let id = match instance.document_id() {
            Some(id) => {
                validate_id(id)?;
                let path = resolved.document_path(id);
                if client.get_document(&path).await?.exists() {
                    log::error!("Document {} already exists", path);
                    return Err(OdmError::new(
                        &format!(
                            "Document with ID {} already exists in {}",
                            id, resolved.collection_path
                        ),
                        ErrorKind::AlreadyExists,
                    ));
                }
                id.to_string()
            }
            None => client.new_document_id(&resolved.collection_path),
        };

        let data = instance.serialize(options)?;
        client.set_document(&resolved.document_path(&id), data).await?;
        instance.assign_id(id);
        instance.cache_parent_path(resolved.parent_path);
        Ok(())
    }

    /// Writes the fields of `instance` to its existing document.
    ///
    /// Fields that are null or still equal to their declared default are left out. An
    /// update with nothing left to write is skipped without calling the store.
    pub async fn update(&self, instance: &mut M) -> OdmResult<()> {
        self.update_with_options(instance, &SerializeOptions::for_update())
            .await
    }

    /// Writes only `fields` (declared field names), even when they hold their default.
    pub async fn update_fields(&self, instance: &mut M, fields: &[&str]) -> OdmResult<()> {
        for field in fields {
            if !M::fields().iter().any(|spec| spec.name() == *field) {
                log::error!("{} has no field {}", M::descriptor().model_name(), field);
                return Err(OdmError::new(
                    &format!("{} has no field {}", M::descriptor().model_name(), field),
                    ErrorKind::ObjectMappingError,
                ));
            }
        }
        let options = SerializeOptions::for_update().include(fields.iter().copied());
        self.update_with_options(instance, &options).await
    }

    pub async fn update_with_options(
        &self,
        instance: &mut M,
        options: &SerializeOptions,
    ) -> OdmResult<()> {
        let client = self.client()?;
        ensure_live(&*instance)?;
        let id = require_id(&*instance)?.to_string();
        let resolved = resolve_instance_collection(&*instance, self.parent.as_ref())?;
        let path = resolved.document_path(&id);

        let data = instance.serialize(options)?;
        if data.is_empty() {
            log::debug!("Skipping update of {} with an empty payload", path);
            return Ok(());
        }

        client.update_document(&path, data).await?;
        instance.cache_parent_path(resolved.parent_path);
        Ok(())
    }

    /// Deletes the document of `instance`, leaving its subcollections in place. The
    /// instance moves to the `Deleted` state.
    pub async fn delete(&self, instance: &mut M) -> OdmResult<()> {
        let client = self.client()?;
        let (path, parent_path) = self.document_path_of(instance)?;
        client.delete_document(&path).await?;
        instance.cache_parent_path(parent_path);
        instance.mark_deleted();
        Ok(())
    }

    /// Deletes the document of `instance` and every descendant document of a registered
    /// child model, children before parents. Returns the number of deleted documents.
    ///
    /// Deletes are committed in chunks of the configured cascade batch size. When a
    /// chunk fails the error is returned and the chunks committed before it stay
    /// deleted; the instance is then not marked deleted.
    pub async fn delete_cascade(&self, instance: &mut M) -> OdmResult<usize> {
        let client = self.client()?;
        let (path, parent_path) = self.document_path_of(instance)?;
        let deleted = cascade_delete(
            client.as_ref(),
            self.db.registry(),
            M::descriptor(),
            &path,
            self.db.config().cascade_batch_size(),
        )
        .await?;
        instance.cache_parent_path(parent_path);
        instance.mark_deleted();
        Ok(deleted)
    }

    fn document_path_of(&self, instance: &M) -> OdmResult<(String, Option<String>)> {
        ensure_live(instance)?;
        let id = require_id(instance)?;
        let resolved = resolve_instance_collection(instance, self.parent.as_ref())?;
        Ok((resolved.document_path(id), resolved.parent_path))
    }

    /// Loads the document `id`. A missing document is `Ok(None)`.
    pub async fn get(&self, id: &str) -> OdmResult<Option<M>> {
        let client = self.client()?;
        validate_id(id)?;
        let resolved = self.resolve()?;
        let snapshot = client.get_document(&resolved.document_path(id)).await?;
        if !snapshot.exists() {
            return Ok(None);
        }
        materialize(snapshot, &ParentSource::Fixed(resolved.parent_path)).map(Some)
    }

    pub async fn exists(&self, id: &str) -> OdmResult<bool> {
        let client = self.client()?;
        validate_id(id)?;
        let resolved = self.resolve()?;
        let snapshot = client.get_document(&resolved.document_path(id)).await?;
        Ok(snapshot.exists())
    }

    /// Number of documents matching `filters`, using the store's native count when
    /// available.
    pub async fn count(&self, filters: &[FieldFilter]) -> OdmResult<u64> {
        let client = self.client()?;
        let resolved = self.resolve()?;
        let query = QueryBuilder::new(QueryTarget::Collection(resolved.collection_path))
            .filters(filters)
            .build()?;
        count_query(client.as_ref(), &query, self.db.config().count_fallback()).await
    }

    pub fn find(&self, filters: &[FieldFilter]) -> OdmResult<ModelStream<M>> {
        self.find_with_options(filters, &FindOptions::new())
    }

    /// Streams the documents matching `filters`, ordered and paginated by `options`.
    pub fn find_with_options(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<ModelStream<M>> {
        self.find_in_collection(filters, None, options)
    }

    /// Like [`find_with_options`](Repository::find_with_options), fetching only the
    /// fields of the projection type `P` and yielding `P` instances.
    pub fn find_as<P: Schema>(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<ModelStream<P>> {
        self.find_in_collection(filters, Some(P::projection()), options)
    }

    pub async fn find_one(&self, filters: &[FieldFilter]) -> OdmResult<Option<M>> {
        self.find_one_with_options(filters, &FindOptions::new()).await
    }

    /// First match of `filters` under `options`, fetched with a limit of one.
    pub async fn find_one_with_options(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<Option<M>> {
        let options = options.clone().limit(1);
        self.find_with_options(filters, &options)?.first().await
    }

    pub async fn find_one_as<P: Schema>(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<Option<P>> {
        let options = options.clone().limit(1);
        self.find_as::<P>(filters, &options)?.first().await
    }

    /// Streams matches from every collection named like `M`'s, whatever their parent.
    ///
    /// The repository's parent scope does not apply. Each result caches the parent
    /// path derived from its own document path.
    pub fn collection_group_find(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<ModelStream<M>> {
        self.find_in_group(filters, None, options)
    }

    pub fn collection_group_find_as<P: Schema>(
        &self,
        filters: &[FieldFilter],
        options: &FindOptions,
    ) -> OdmResult<ModelStream<P>> {
        self.find_in_group(filters, Some(P::projection()), options)
    }

    fn find_in_collection<T: Schema>(
        &self,
        filters: &[FieldFilter],
        projection: Option<Vec<String>>,
        options: &FindOptions,
    ) -> OdmResult<ModelStream<T>> {
        let client = self.client()?;
        let resolved = self.resolve()?;
        let query = QueryBuilder::new(QueryTarget::Collection(resolved.collection_path))
            .filters(filters)
            .projection(projection)
            .options(options)
            .build()?;
        Ok(ModelStream::new(
            client.stream(&query),
            ParentSource::Fixed(resolved.parent_path),
        ))
    }

    fn find_in_group<T: Schema>(
        &self,
        filters: &[FieldFilter],
        projection: Option<Vec<String>>,
        options: &FindOptions,
    ) -> OdmResult<ModelStream<T>> {
        let client = self.client()?;
        let descriptor = M::descriptor();
        let target = QueryTarget::CollectionGroup(descriptor.collection_name().to_string());
        let query = QueryBuilder::new(target)
            .filters(filters)
            .projection(projection)
            .options(options)
            .build()?;
        Ok(ModelStream::new(
            client.stream(&query),
            ParentSource::PerDocument(descriptor),
        ))
    }

    fn resolve(&self) -> OdmResult<ResolvedCollection> {
        resolve_collection(M::descriptor(), self.parent.as_ref(), None)
    }

    fn client(&self) -> OdmResult<Arc<dyn StoreClient>> {
        self.db.check_opened()?;
        Ok(self.db.client())
    }
}

/// Counts `query` natively, or, when the store has no native count and `fallback` is
/// set, by streaming the matching ids.
pub(crate) async fn count_query(
    client: &dyn StoreClient,
    query: &Query,
    fallback: bool,
) -> OdmResult<u64> {
    match client.count(query).await {
        Err(err) if fallback && err.kind() == &ErrorKind::UnsupportedOperation => {
            log::warn!(
                "Native count is unavailable for {}, performing count by fetching all matching documents with an empty projection",
                query.target()
            );
            let ids_only = query.clone().select(vec![]);
            client
                .stream(&ids_only)
                .try_fold(0u64, |count, _| async move { Ok(count + 1) })
                .await
        }
        result => result,
    }
}
