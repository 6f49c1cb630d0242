//! Configuration of a [`Database`](crate::database::Database).

use crate::common::{DEFAULT_DATABASE_ID, DEFAULT_PROJECT_ID, MAX_BATCH_SIZE};
use crate::errors::{ErrorKind, OdmError, OdmResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Public interface for database configuration.
///
/// A configuration is mutable until the database built from it is opened; after
/// that every setter fails with `InvalidOperation`.
///
/// ```rust,ignore
/// let db = Database::builder()
///     .client(InMemoryStore::default())
///     .project_id("demo")
///     .cascade_batch_size(100)
///     .build()?;
/// assert_eq!(db.config().cascade_batch_size(), 100);
/// ```
#[derive(Clone)]
pub struct OdmConfig {
    inner: Arc<OdmConfigInner>,
}

impl Default for OdmConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OdmConfig {
    pub fn new() -> Self {
        OdmConfig {
            inner: Arc::new(OdmConfigInner::new()),
        }
    }

    pub fn project_id(&self) -> String {
        self.inner.settings.read().project_id.clone()
    }

    pub fn database_id(&self) -> String {
        self.inner.settings.read().database_id.clone()
    }

    /// Maximum number of deletes committed together by a cascading delete.
    pub fn cascade_batch_size(&self) -> usize {
        self.inner.settings.read().cascade_batch_size
    }

    /// Whether `count` falls back to streaming ids when the store has no native count.
    pub fn count_fallback(&self) -> bool {
        self.inner.settings.read().count_fallback
    }

    pub fn set_project_id(&self, project_id: &str) -> OdmResult<()> {
        self.inner.check_mutable()?;
        if project_id.trim().is_empty() {
            log::error!("Project id cannot be empty");
            return Err(OdmError::new(
                "Project id cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.inner.settings.write().project_id = project_id.to_string();
        Ok(())
    }

    pub fn set_database_id(&self, database_id: &str) -> OdmResult<()> {
        self.inner.check_mutable()?;
        if database_id.trim().is_empty() {
            log::error!("Database id cannot be empty");
            return Err(OdmError::new(
                "Database id cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.inner.settings.write().database_id = database_id.to_string();
        Ok(())
    }

    /// Sets the cascade chunk size, which must lie in `1..=500`.
    pub fn set_cascade_batch_size(&self, size: usize) -> OdmResult<()> {
        self.inner.check_mutable()?;
        if size == 0 || size > MAX_BATCH_SIZE {
            log::error!(
                "Cascade batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE,
                size
            );
            return Err(OdmError::new(
                &format!("Cascade batch size must be between 1 and {}", MAX_BATCH_SIZE),
                ErrorKind::InvalidOperation,
            ));
        }
        self.inner.settings.write().cascade_batch_size = size;
        Ok(())
    }

    pub fn set_count_fallback(&self, enabled: bool) -> OdmResult<()> {
        self.inner.check_mutable()?;
        self.inner.settings.write().count_fallback = enabled;
        Ok(())
    }

    /// Freezes the configuration.
    pub(crate) fn initialize(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OdmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settings = self.inner.settings.read();
        f.debug_struct("OdmConfig")
            .field("project_id", &settings.project_id)
            .field("database_id", &settings.database_id)
            .field("cascade_batch_size", &settings.cascade_batch_size)
            .field("count_fallback", &settings.count_fallback)
            .finish()
    }
}

struct Settings {
    project_id: String,
    database_id: String,
    cascade_batch_size: usize,
    count_fallback: bool,
}

struct OdmConfigInner {
    configured: AtomicBool,
    settings: RwLock<Settings>,
}

impl OdmConfigInner {
    fn new() -> Self {
        OdmConfigInner {
            configured: AtomicBool::new(false),
            settings: RwLock::new(Settings {
                project_id: DEFAULT_PROJECT_ID.to_string(),
                database_id: DEFAULT_DATABASE_ID.to_string(),
                cascade_batch_size: MAX_BATCH_SIZE,
                count_fallback: true,
            }),
        }
    }

    fn check_mutable(&self) -> OdmResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("Configuration cannot be changed after the database is opened");
            return Err(OdmError::new(
                "Configuration cannot be changed after the database is opened",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
