use crate::collection::DocumentSnapshot;
use crate::errors::OdmResult;
use crate::model::{parent_path_from_document_path, ModelDescriptor, Schema};
use crate::store::SnapshotStream;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Where a loaded instance's parent path comes from.
#[derive(Debug, Clone)]
pub(crate) enum ParentSource {
    /// Every result lives in the same, already resolved collection.
    Fixed(Option<String>),
    /// Collection group results: derived from each document's own path.
    PerDocument(&'static ModelDescriptor),
}

impl ParentSource {
    fn parent_of(&self, snapshot: &DocumentSnapshot) -> OdmResult<Option<String>> {
        match self {
            ParentSource::Fixed(parent_path) => Ok(parent_path.clone()),
            ParentSource::PerDocument(descriptor) => {
                parent_path_from_document_path(descriptor, snapshot.path())
            }
        }
    }
}

/// Builds an instance from a snapshot, injecting the id and the parent path.
pub(crate) fn materialize<T: Schema>(
    snapshot: DocumentSnapshot,
    parent: &ParentSource,
) -> OdmResult<T> {
    let parent_path = parent.parent_of(&snapshot)?;
    let id = snapshot.id().to_string();
    let data = snapshot.into_data().unwrap_or_default();

    let mut instance = T::from_document(&data)?;
    instance.set_id(id);
    if let Some(meta) = instance.meta_mut() {
        meta.set_parent_path(parent_path);
    }
    Ok(instance)
}

/// Lazy, forward-only sequence of loaded instances.
///
/// Nothing is fetched until the stream is polled. Dropping it early releases the
/// underlying store stream without draining it.
///
/// ```rust,ignore
/// let mut users = repo.find(&[User::FIELDS.age.gte(30)])?;
/// while let Some(user) = users.next().await {
///     println!("{}", user?.name);
/// }
/// ```
pub struct ModelStream<T> {
    inner: BoxStream<'static, OdmResult<T>>,
}

impl<T: Schema> ModelStream<T> {
    pub(crate) fn new(snapshots: SnapshotStream, parent: ParentSource) -> Self {
        let inner = snapshots
            .map(move |result| result.and_then(|snapshot| materialize(snapshot, &parent)))
            .boxed();
        ModelStream { inner }
    }

    /// Drains the stream, stopping at the first error.
    pub async fn try_collect_all(self) -> OdmResult<Vec<T>> {
        self.inner.try_collect().await
    }

    /// First instance, if any. The rest of the stream is dropped unread.
    pub async fn first(mut self) -> OdmResult<Option<T>> {
        self.inner.next().await.transpose()
    }
}

impl<T> Stream for ModelStream<T> {
    type Item = OdmResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
