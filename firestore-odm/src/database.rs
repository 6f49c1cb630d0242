use crate::database_builder::DatabaseBuilder;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{DocumentInstance, DocumentModel, ModelDescriptor, ModelRegistry};
use crate::odm_config::OdmConfig;
use crate::repository::{execute_batch, BatchOperation, Repository, Subcollection};
use crate::store::StoreClient;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Entry point of the mapper: a store client bound to a registry of model types.
///
/// # Purpose
/// `Database` replaces any process-wide binding of models to a client. It is built once
/// at startup with [`Database::builder`], holds the injected [`StoreClient`], the set of
/// registered models and the [`OdmConfig`], and hands out typed [`Repository`] handles.
///
/// # Characteristics
/// - **Cheap to clone**: all clones share one state through `Arc`
/// - **Explicit registry**: only registered models get repositories; cascading deletes
///   follow the parent edges of registered models
/// - **Closable**: after `close` every repository call fails with `NotInitialized`
///
/// # Usage
/// ```rust,ignore
/// let db = Database::builder()
///     .client(InMemoryStore::default())
///     .register::<User>()
///     .register::<Post>()
///     .build()?;
///
/// let users = db.repository::<User>()?;
/// let mut alice = User { name: "Alice".into(), ..Default::default() };
/// users.save(&mut alice).await?;
///
/// let posts = db.subcollection::<Post>(&alice)?;
/// posts.add(&mut Post { title: "Hello".into(), ..Default::default() }).await?;
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub(crate) fn new(
        client: Arc<dyn StoreClient>,
        registry: ModelRegistry,
        config: OdmConfig,
    ) -> Self {
        config.initialize();
        log::info!(
            "Opened database {}/{} with {} registered models",
            config.project_id(),
            config.database_id(),
            registry.len()
        );
        Database {
            inner: Arc::new(DatabaseInner {
                client,
                registry,
                config,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the repository of a registered model.
    ///
    /// # Errors
    ///
    /// `NotInitialized` if the database is closed or `M` was not registered.
    pub fn repository<M: DocumentModel>(&self) -> OdmResult<Repository<M>> {
        self.check_opened()?;
        self.check_registered(M::descriptor())?;
        Ok(Repository::new(self.clone()))
    }

    /// Returns an accessor for the `C` documents under `parent`.
    ///
    /// # Errors
    ///
    /// `InvalidAccessorBinding` if `C` does not declare `parent`'s model as its parent,
    /// and the errors of resolving `parent`'s document path.
    pub fn subcollection<C: DocumentModel>(
        &self,
        parent: &dyn DocumentInstance,
    ) -> OdmResult<Subcollection<C>> {
        Subcollection::bind(self, parent)
    }

    /// Commits creates, updates and deletes on instances of any registered models as
    /// one atomic write.
    pub async fn batch_write(&self, operations: Vec<BatchOperation<'_>>) -> OdmResult<()> {
        self.check_opened()?;
        for operation in &operations {
            self.check_registered(operation.instance().model_descriptor())?;
        }
        execute_batch(self.inner.client.as_ref(), operations).await
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &OdmConfig {
        &self.inner.config
    }

    pub fn client(&self) -> Arc<dyn StoreClient> {
        self.inner.client.clone()
    }

    /// Closes the database. Repositories obtained earlier stop working. Closing twice
    /// is a no-op.
    pub fn close(&self) -> OdmResult<()> {
        if !self.inner.closed.swap(true, Ordering::Relaxed) {
            log::info!(
                "Closed database {}/{}",
                self.inner.config.project_id(),
                self.inner.config.database_id()
            );
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    pub(crate) fn check_opened(&self) -> OdmResult<()> {
        if self.is_closed() {
            log::error!("Database is closed");
            return Err(OdmError::new(
                "Database is closed",
                ErrorKind::NotInitialized,
            ));
        }
        Ok(())
    }

    fn check_registered(&self, descriptor: &'static ModelDescriptor) -> OdmResult<()> {
        if !self.inner.registry.contains(descriptor) {
            log::error!("Model {} is not registered", descriptor.model_name());
            return Err(OdmError::new(
                &format!(
                    "Model {} is not registered with this database",
                    descriptor.model_name()
                ),
                ErrorKind::NotInitialized,
            ));
        }
        Ok(())
    }
}

struct DatabaseInner {
    client: Arc<dyn StoreClient>,
    registry: ModelRegistry,
    config: OdmConfig,
    closed: AtomicBool,
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("project_id", &self.inner.config.project_id())
            .field("database_id", &self.inner.config.database_id())
            .field("models", &self.inner.registry)
            .field("closed", &self.is_closed())
            .finish()
    }
}
