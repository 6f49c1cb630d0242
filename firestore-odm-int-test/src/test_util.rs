use crate::models::{Comment, Post, Setting, User};
use firestore_odm::database::Database;
use firestore_odm::database_builder::DatabaseBuilder;
use firestore_odm::errors::OdmResult;
use firestore_odm::store::memory::{InMemoryStore, InMemoryStoreConfig};
use std::future::Future;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Runs an async test between a setup and a teardown step.
///
/// The teardown runs whether the test failed or not. Any error fails the test with
/// the step it came from.
pub async fn run_test<B, T, Fut, A>(before: B, test: T, after: A)
where
    B: FnOnce() -> OdmResult<TestContext>,
    T: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = OdmResult<()>>,
    A: FnOnce(TestContext) -> OdmResult<()>,
{
    LOGGER.call_once(colog::init);

    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = test(ctx.clone()).await;
    let after_result = after(ctx);

    if let Err(e) = result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    db: Database,
    store: InMemoryStore,
}

impl TestContext {
    pub fn new(db: Database, store: InMemoryStore) -> Self {
        Self { db, store }
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }

    /// The store behind the database, for raw inspection and fault injection.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

/// A database over a fresh in-memory store with every test model registered.
pub fn create_test_context() -> OdmResult<TestContext> {
    create_test_context_with(InMemoryStoreConfig::new(), |builder| builder)
}

pub fn create_test_context_with<F>(config: InMemoryStoreConfig, configure: F) -> OdmResult<TestContext>
where
    F: FnOnce(DatabaseBuilder) -> DatabaseBuilder,
{
    let store = InMemoryStore::new(config);
    let builder = Database::builder()
        .client(store.clone())
        .project_id("int-test")
        .register::<User>()
        .register::<Post>()
        .register::<Comment>()
        .register::<Setting>();
    let db = configure(builder).build()?;
    Ok(TestContext::new(db, store))
}

pub fn cleanup(ctx: TestContext) -> OdmResult<()> {
    ctx.store.clear();
    ctx.db.close()
}
