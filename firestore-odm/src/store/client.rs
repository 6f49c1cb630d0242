use crate::collection::{Document, DocumentSnapshot};
use crate::common::generate_auto_id;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::query::Query;
use crate::store::WriteOp;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy sequence of query results. Dropping it releases the underlying cursor.
pub type SnapshotStream = BoxStream<'static, OdmResult<DocumentSnapshot>>;

/// Contract of the backing document-store driver.
///
/// Paths are slash-separated: a collection path has an odd number of segments
/// (`users`, `users/u1/posts`), a document path an even number (`users/u1`). Every
/// failure of the driver surfaces as an [`OdmError`], normally of kind
/// `BackendFailure`, and is propagated to the caller unchanged.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Generates an id for a new document in `collection_path`.
    fn new_document_id(&self, _collection_path: &str) -> String {
        generate_auto_id()
    }

    /// Reads the document at `path`. A missing document is a snapshot without data,
    /// not an error.
    async fn get_document(&self, path: &str) -> OdmResult<DocumentSnapshot>;

    /// Creates or overwrites the document at `path`.
    async fn set_document(&self, path: &str, data: Document) -> OdmResult<()>;

    /// Writes the given field paths of an existing document. Fails with `NotFound`
    /// when there is no document at `path`.
    async fn update_document(&self, path: &str, data: Document) -> OdmResult<()>;

    /// Deletes the document at `path`. Deleting a missing document succeeds.
    async fn delete_document(&self, path: &str) -> OdmResult<()>;

    /// Names of the subcollections directly under the document at `path`.
    async fn list_collections(&self, path: &str) -> OdmResult<Vec<String>>;

    /// Runs `query`, yielding matches in query order.
    fn stream(&self, query: &Query) -> SnapshotStream;

    /// Native aggregate count of `query`. Drivers without aggregation support keep
    /// this default, which fails with `UnsupportedOperation`.
    async fn count(&self, _query: &Query) -> OdmResult<u64> {
        Err(OdmError::new(
            "Aggregate count is not supported by this store",
            ErrorKind::UnsupportedOperation,
        ))
    }

    /// Applies all writes as one atomic unit: either every write is applied or none.
    async fn commit(&self, writes: Vec<WriteOp>) -> OdmResult<()>;
}
