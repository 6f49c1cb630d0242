use super::query_engine::{check_limits, execute};
use super::InMemoryStoreConfig;
use crate::collection::{Document, DocumentSnapshot};
use crate::common::PATH_SEPARATOR;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::query::Query;
use crate::store::{SnapshotStream, StoreClient, WriteOp};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory implementation of a Firestore-style document store.
///
/// # Purpose
/// `InMemoryStore` keeps every document in a sorted map keyed by its full path. It
/// implements the whole [`StoreClient`] contract, including collection group queries
/// and atomic batch commits, which makes it suitable for tests and local tooling.
///
/// # Characteristics
/// - **Thread-Safe**: clones share the same documents
/// - **Fault Injection**: can be switched offline or made to fail after a number of writes
/// - **Introspection**: exposes write counts and raw documents to test code
/// - **No Persistence**: all data is lost when the last clone is dropped
///
/// # Usage
/// ```text
/// let store = InMemoryStore::new(InMemoryStoreConfig::new());
/// let db = Database::builder().client(store.clone()).register::<User>().build()?;
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new(InMemoryStoreConfig::default())
    }
}

impl InMemoryStore {
    pub fn new(store_config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(store_config)),
        }
    }

    /// While offline every call fails with `BackendFailure`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::Relaxed);
    }

    /// Number of successful write calls (set, update, delete or commit).
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }

    /// Number of single-document reads served.
    pub fn read_count(&self) -> u64 {
        self.inner.reads.load(Ordering::Relaxed)
    }

    pub fn document_count(&self) -> usize {
        self.inner.documents.read().len()
    }

    /// Paths of every stored document, in path order.
    pub fn paths(&self) -> Vec<String> {
        self.inner.documents.read().keys().cloned().collect()
    }

    /// Reads a document without going through the client contract.
    pub fn get_raw(&self, path: &str) -> Option<Document> {
        self.inner.documents.read().get(path).cloned()
    }

    /// Writes a document without going through the client contract.
    pub fn insert_raw(&self, path: impl Into<String>, data: Document) {
        self.inner.documents.write().insert(path.into(), data);
    }

    pub fn clear(&self) {
        self.inner.documents.write().clear();
    }
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn get_document(&self, path: &str) -> OdmResult<DocumentSnapshot> {
        self.inner.get_document(path)
    }

    async fn set_document(&self, path: &str, data: Document) -> OdmResult<()> {
        self.inner.apply(vec![WriteOp::Set {
            path: path.to_string(),
            data,
        }])
    }

    async fn update_document(&self, path: &str, data: Document) -> OdmResult<()> {
        self.inner.apply(vec![WriteOp::Update {
            path: path.to_string(),
            data,
        }])
    }

    async fn delete_document(&self, path: &str) -> OdmResult<()> {
        self.inner.apply(vec![WriteOp::Delete {
            path: path.to_string(),
        }])
    }

    async fn list_collections(&self, path: &str) -> OdmResult<Vec<String>> {
        self.inner.list_collections(path)
    }

    fn stream(&self, query: &Query) -> SnapshotStream {
        let inner = self.inner.clone();
        let query = query.clone();
        // evaluated on first poll
        stream::once(async move { inner.run_query(&query) })
            .flat_map(|result| match result {
                Ok(snapshots) => stream::iter(snapshots.into_iter().map(Ok).collect::<Vec<_>>()),
                Err(err) => stream::iter(vec![Err(err)]),
            })
            .boxed()
    }

    async fn count(&self, query: &Query) -> OdmResult<u64> {
        if !self.inner.config.aggregation() {
            log::error!("Aggregate count is disabled for this store");
            return Err(OdmError::new(
                "Aggregate count is not supported by this store",
                ErrorKind::UnsupportedOperation,
            ));
        }
        let snapshots = self.inner.run_query(query)?;
        Ok(snapshots.len() as u64)
    }

    async fn commit(&self, writes: Vec<WriteOp>) -> OdmResult<()> {
        self.inner.apply(writes)
    }
}

struct InMemoryStoreInner {
    documents: RwLock<BTreeMap<String, Document>>,
    offline: AtomicBool,
    writes: AtomicU64,
    reads: AtomicU64,
    config: InMemoryStoreConfig,
}

impl InMemoryStoreInner {
    fn new(config: InMemoryStoreConfig) -> Self {
        InMemoryStoreInner {
            documents: RwLock::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
            writes: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            config,
        }
    }

    fn check_online(&self) -> OdmResult<()> {
        if self.offline.load(Ordering::Relaxed) {
            log::error!("In-memory store is offline");
            return Err(OdmError::new(
                "Store is unavailable",
                ErrorKind::BackendFailure,
            ));
        }
        Ok(())
    }

    fn get_document(&self, path: &str) -> OdmResult<DocumentSnapshot> {
        self.check_online()?;
        check_document_path(path)?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        let data = self.documents.read().get(path).cloned();
        Ok(DocumentSnapshot::new(path, data))
    }

    fn list_collections(&self, path: &str) -> OdmResult<Vec<String>> {
        self.check_online()?;
        check_document_path(path)?;
        let prefix = format!("{}{}", path, PATH_SEPARATOR);
        let documents = self.documents.read();
        let names = documents
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split_once(PATH_SEPARATOR).map(|(name, _)| name))
            .unique()
            .map(str::to_string)
            .collect();
        Ok(names)
    }

    fn run_query(&self, query: &Query) -> OdmResult<Vec<DocumentSnapshot>> {
        self.check_online()?;
        check_limits(query)?;
        let documents = self.documents.read();
        Ok(execute(&documents, query))
    }

    /// Applies `writes` all-or-nothing as one write call.
    fn apply(&self, writes: Vec<WriteOp>) -> OdmResult<()> {
        self.check_online()?;
        if let Some(budget) = self.config.write_budget() {
            if self.writes.load(Ordering::Relaxed) >= budget {
                log::error!("In-memory store write budget of {} exhausted", budget);
                return Err(OdmError::new(
                    "Injected write failure",
                    ErrorKind::BackendFailure,
                ));
            }
        }

        let mut documents = self.documents.write();
        // final state per touched path, later writes win
        let mut staged: BTreeMap<String, Option<Document>> = BTreeMap::new();
        for write in writes {
            check_document_path(write.path())?;
            match write {
                WriteOp::Set { path, data } => {
                    staged.insert(path, Some(data));
                }
                WriteOp::Update { path, data } => {
                    let current = match staged.get(&path) {
                        Some(state) => state.clone(),
                        None => documents.get(&path).cloned(),
                    };
                    match current {
                        Some(mut existing) => {
                            existing.merge(&data)?;
                            staged.insert(path, Some(existing));
                        }
                        None => {
                            log::error!("No document to update at {}", path);
                            return Err(OdmError::new(
                                &format!("No document to update: {}", path),
                                ErrorKind::NotFound,
                            ));
                        }
                    }
                }
                WriteOp::Delete { path } => {
                    staged.insert(path, None);
                }
            }
        }

        for (path, state) in staged {
            match state {
                Some(data) => {
                    documents.insert(path, data);
                }
                None => {
                    documents.remove(&path);
                }
            }
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn check_document_path(path: &str) -> OdmResult<()> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
        log::error!("Not a document path: {}", path);
        return Err(OdmError::new(
            &format!("Not a document path: {}", path),
            ErrorKind::InvalidPath,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;
    use crate::doc;
    use crate::filter::field;
    use crate::store::WriteBatch;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn set_get_and_delete() {
        let store = InMemoryStore::default();
        store.set_document("users/u1", doc! { name: "Alice" }).await.unwrap();

        let snapshot = store.get_document("users/u1").await.unwrap();
        assert!(snapshot.exists());
        assert_eq!(snapshot.data().unwrap().get("name"), Some(&Value::from("Alice")));

        store.delete_document("users/u1").await.unwrap();
        assert!(!store.get_document("users/u1").await.unwrap().exists());
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_requires_document() {
        let store = InMemoryStore::default();
        let err = store
            .update_document("users/u1", doc! { age: 3 })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);

        store.insert_raw("users/u1", doc! { name: "Alice", age: 1 });
        store.update_document("users/u1", doc! { age: 3 }).await.unwrap();
        assert_eq!(store.get_raw("users/u1"), Some(doc! { name: "Alice", age: 3 }));
    }

    #[tokio::test]
    async fn rejects_collection_paths() {
        let store = InMemoryStore::default();
        let err = store.get_document("users").await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidPath);
        assert!(store.set_document("users//x", doc! {}).await.is_err());
    }

    #[tokio::test]
    async fn lists_direct_subcollections() {
        let store = InMemoryStore::default();
        store.insert_raw("users/u1", doc! {});
        store.insert_raw("users/u1/posts/p1", doc! {});
        store.insert_raw("users/u1/posts/p2", doc! {});
        store.insert_raw("users/u1/posts/p1/comments/c1", doc! {});
        store.insert_raw("users/u1/likes/l1", doc! {});
        store.insert_raw("users/u10/drafts/d1", doc! {});

        let names = store.list_collections("users/u1").await.unwrap();
        assert_eq!(names, vec!["likes".to_string(), "posts".to_string()]);
        assert!(store.list_collections("users/u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_runs_query() {
        let store = InMemoryStore::default();
        store.insert_raw("users/u1", doc! { age: 30 });
        store.insert_raw("users/u2", doc! { age: 20 });

        let query = Query::collection("users").where_filter(field("age").gt(25));
        let snapshots: Vec<DocumentSnapshot> = store.stream(&query).try_collect().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id(), "u1");
        assert_eq!(store.count(&query).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn refuses_unsupported_filter_combinations() {
        let store = InMemoryStore::default();
        store.insert_raw("users/u1", doc! { a: 1, b: 2 });

        let query = Query::collection("users")
            .where_filter(field("a").not_in(vec![3]))
            .where_filter(field("b").ne(4));
        let result: OdmResult<Vec<DocumentSnapshot>> = store.stream(&query).try_collect().await;
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::FilterError);
        assert!(store.count(&query).await.is_err());
    }

    #[tokio::test]
    async fn count_can_be_disabled() {
        let store = InMemoryStore::new(InMemoryStoreConfig::new().without_aggregation());
        let err = store.count(&Query::collection("users")).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedOperation);
    }

    #[tokio::test]
    async fn commit_is_atomic() {
        let store = InMemoryStore::default();
        store.insert_raw("users/u1", doc! { name: "Alice" });

        let mut batch = WriteBatch::new();
        batch.delete("users/u1");
        batch.update("users/missing", doc! { a: 1 });
        assert!(batch.commit(&store).await.is_err());
        assert!(store.get_raw("users/u1").is_some());

        let mut batch = WriteBatch::new();
        batch.set("users/u2", doc! { name: "Bob" });
        batch.delete("users/u1");
        batch.commit(&store).await.unwrap();
        assert_eq!(store.paths(), vec!["users/u2".to_string()]);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn commit_sees_its_own_earlier_writes() {
        let store = InMemoryStore::default();
        store.insert_raw("users/u1", doc! { name: "Alice" });

        let mut batch = WriteBatch::new();
        batch.set("users/u2", doc! { name: "Bob" });
        batch.update("users/u2", doc! { age: 30 });
        batch.delete("users/u1");
        batch.set("users/u1", doc! { name: "Alice again" });
        batch.commit(&store).await.unwrap();
        assert_eq!(store.get_raw("users/u2"), Some(doc! { name: "Bob", age: 30 }));
        assert_eq!(store.get_raw("users/u1"), Some(doc! { name: "Alice again" }));

        // an update of a document deleted earlier in the same commit fails it whole
        let mut batch = WriteBatch::new();
        batch.set("users/u3", doc! { name: "Carol" });
        batch.delete("users/u2");
        batch.update("users/u2", doc! { age: 31 });
        let err = batch.commit(&store).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        assert_eq!(store.paths(), vec!["users/u1".to_string(), "users/u2".to_string()]);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryStore::default();
        store.set_offline(true);
        let err = store.get_document("users/u1").await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendFailure);
        let result: OdmResult<Vec<DocumentSnapshot>> =
            store.stream(&Query::collection("users")).try_collect().await;
        assert!(result.is_err());

        store.set_offline(false);
        assert!(store.get_document("users/u1").await.is_ok());
    }

    #[tokio::test]
    async fn write_budget_injects_failures() {
        let store = InMemoryStore::new(InMemoryStoreConfig::new().fail_after_writes(1));
        store.set_document("users/u1", doc! {}).await.unwrap();
        let err = store.set_document("users/u2", doc! {}).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendFailure);
        assert_eq!(store.document_count(), 1);
    }

    #[tokio::test]
    async fn clones_share_documents() {
        let store = InMemoryStore::default();
        let other = store.clone();
        other.set_document("users/u1", doc! {}).await.unwrap();
        assert_eq!(store.document_count(), 1);
        store.clear();
        assert_eq!(other.document_count(), 0);
    }
}
