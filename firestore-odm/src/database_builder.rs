use crate::database::Database;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{DocumentModel, ModelRegistry};
use crate::odm_config::OdmConfig;
use crate::store::StoreClient;
use std::sync::Arc;

/// Builder for a [`Database`].
///
/// Setters never fail on their own. The first configuration error is kept and
/// returned by [`build`](DatabaseBuilder::build), later setters are ignored.
///
/// # Examples
///
/// ```rust,ignore
/// let db = Database::builder()
///     .client(InMemoryStore::default())
///     .register::<User>()
///     .register::<Post>()
///     .cascade_batch_size(200)
///     .build()?;
/// ```
#[derive(Default)]
pub struct DatabaseBuilder {
    error: Option<OdmError>,
    client: Option<Arc<dyn StoreClient>>,
    registry: ModelRegistry,
    config: OdmConfig,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        DatabaseBuilder::default()
    }

    /// Injects the store client every repository of the database goes through.
    pub fn client<C: StoreClient + 'static>(self, client: C) -> Self {
        self.shared_client(Arc::new(client))
    }

    /// Injects a client that is already shared elsewhere.
    pub fn shared_client(mut self, client: Arc<dyn StoreClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Adds `M` to the active model set. Registering twice is harmless.
    pub fn register<M: DocumentModel>(mut self) -> Self {
        self.registry.register(M::descriptor());
        self
    }

    pub fn project_id(mut self, project_id: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_project_id(project_id) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn database_id(mut self, database_id: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_database_id(database_id) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Number of deletes a cascading delete commits together, `1..=500`.
    pub fn cascade_batch_size(mut self, size: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_cascade_batch_size(size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Whether `count` may fall back to fetching ids when the store has no native count.
    pub fn count_fallback(mut self, enabled: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_count_fallback(enabled) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the database.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter, `NotInitialized` when no client was
    /// injected, and `InvalidOperation` when the registered parent edges do not form
    /// a forest of registered models.
    pub fn build(self) -> OdmResult<Database> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let client = match self.client {
            Some(client) => client,
            None => {
                log::error!("No store client was given to the database builder");
                return Err(OdmError::new(
                    "No store client is bound: call client() before build()",
                    ErrorKind::NotInitialized,
                ));
            }
        };

        self.registry.validate()?;
        Ok(Database::new(client, self.registry, self.config))
    }
}
