use crate::collection::DocumentSnapshot;
use crate::errors::OdmResult;
use crate::model::{join_path, ModelDescriptor, ModelRegistry};
use crate::query::Query;
use crate::store::{StoreClient, WriteBatch};
use futures::TryStreamExt;

struct Frame {
    descriptor: &'static ModelDescriptor,
    path: String,
    expanded: bool,
}

/// Deletes the document at `root_path` and every descendant reachable through the
/// registered child types.
///
/// The hierarchy is walked depth first with an explicit stack. A document is queued
/// for deletion only once its whole subtree is queued, so every descendant is deleted
/// before its ancestors. Deletes are committed in chunks of `batch_size`, in queue
/// order. A failed chunk aborts the walk; chunks already committed stay deleted.
///
/// Child documents are listed by id only and never deserialized. Subcollections of
/// unregistered model types are left in place.
pub(crate) async fn cascade_delete(
    client: &dyn StoreClient,
    registry: &ModelRegistry,
    root: &'static ModelDescriptor,
    root_path: &str,
    batch_size: usize,
) -> OdmResult<usize> {
    let mut stack = vec![Frame {
        descriptor: root,
        path: root_path.to_string(),
        expanded: false,
    }];
    let mut pending = WriteBatch::new();
    let mut deleted = 0;

    while let Some(frame) = stack.pop() {
        if frame.expanded {
            pending.delete(frame.path);
            if pending.len() >= batch_size {
                deleted += flush(client, &mut pending).await?;
            }
            continue;
        }

        let children = child_frames(client, registry, &frame).await?;
        stack.push(Frame {
            expanded: true,
            ..frame
        });
        stack.extend(children);
    }

    deleted += flush(client, &mut pending).await?;
    log::debug!("Cascade from {} deleted {} documents", root_path, deleted);
    Ok(deleted)
}

async fn child_frames(
    client: &dyn StoreClient,
    registry: &ModelRegistry,
    frame: &Frame,
) -> OdmResult<Vec<Frame>> {
    let mut children = Vec::new();
    for child_type in registry.child_types(frame.descriptor) {
        let collection_path = join_path(&frame.path, child_type.collection_name());
        let query = Query::collection(collection_path).select(vec![]);
        let snapshots: Vec<DocumentSnapshot> = client.stream(&query).try_collect().await?;
        children.extend(snapshots.into_iter().map(|snapshot| Frame {
            descriptor: child_type,
            path: snapshot.path().to_string(),
            expanded: false,
        }));
    }
    Ok(children)
}

async fn flush(client: &dyn StoreClient, pending: &mut WriteBatch) -> OdmResult<usize> {
    let batch = std::mem::take(pending);
    let size = batch.len();
    if size > 0 {
        log::debug!("Committing {} cascade deletes", size);
        batch.commit(client).await?;
    }
    Ok(size)
}
