use crate::common::MAX_BATCH_SIZE;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{
    ensure_live, require_id, resolve_instance_collection, validate_id, DocumentInstance,
    SerializeOptions,
};
use crate::store::{StoreClient, WriteBatch};
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Create,
    Update,
    Delete,
}

impl Display for BatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchKind::Create => write!(f, "CREATE"),
            BatchKind::Update => write!(f, "UPDATE"),
            BatchKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// One write of a batch, bound to the instance it applies to.
///
/// Each instance resolves its own collection from its cached parent path, so a batch
/// may span several model types and parents. A create without an id receives a
/// generated one once the batch is committed.
///
/// ```rust,ignore
/// db.batch_write(vec![
///     BatchOperation::create(&mut new_user),
///     BatchOperation::update(&mut existing_post),
///     BatchOperation::delete(&mut old_comment),
/// ]).await?;
/// ```
pub struct BatchOperation<'a> {
    kind: BatchKind,
    instance: &'a mut dyn DocumentInstance,
}

impl<'a> BatchOperation<'a> {
    pub fn new(kind: BatchKind, instance: &'a mut dyn DocumentInstance) -> Self {
        BatchOperation { kind, instance }
    }

    pub fn create(instance: &'a mut dyn DocumentInstance) -> Self {
        BatchOperation::new(BatchKind::Create, instance)
    }

    pub fn update(instance: &'a mut dyn DocumentInstance) -> Self {
        BatchOperation::new(BatchKind::Update, instance)
    }

    pub fn delete(instance: &'a mut dyn DocumentInstance) -> Self {
        BatchOperation::new(BatchKind::Delete, instance)
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    pub fn instance(&self) -> &dyn DocumentInstance {
        &*self.instance
    }
}

impl Debug for BatchOperation<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOperation")
            .field("kind", &self.kind)
            .field("model", &self.instance.model_descriptor().model_name())
            .field("id", &self.instance.document_id())
            .finish()
    }
}

/// What a staged operation does to its instance after a successful commit.
struct Outcome {
    id: Option<String>,
    parent_path: Option<String>,
}

/// Stages every operation into one [`WriteBatch`] and commits it.
///
/// Instances are only touched after the commit succeeds: creates receive their id
/// and parent path, deletes move to the `Deleted` state.
pub(crate) async fn execute_batch(
    client: &dyn StoreClient,
    operations: Vec<BatchOperation<'_>>,
) -> OdmResult<()> {
    if operations.len() > MAX_BATCH_SIZE {
        log::error!(
            "A batch holds at most {} operations, got {}",
            MAX_BATCH_SIZE,
            operations.len()
        );
        return Err(OdmError::new(
            &format!("A batch holds at most {} operations", MAX_BATCH_SIZE),
            ErrorKind::InvalidOperation,
        ));
    }

    let mut batch = WriteBatch::new();
    let mut outcomes = Vec::with_capacity(operations.len());
    for operation in &operations {
        outcomes.push(stage(client, &mut batch, operation)?);
    }

    if batch.is_empty() {
        log::debug!("Nothing to commit in batch of {} operations", operations.len());
    } else {
        batch.commit(client).await?;
    }

    for (operation, outcome) in operations.into_iter().zip(outcomes) {
        match operation.kind {
            BatchKind::Create => {
                if let Some(id) = outcome.id {
                    operation.instance.assign_id(id);
                }
                operation.instance.cache_parent_path(outcome.parent_path);
            }
            BatchKind::Update => {}
            BatchKind::Delete => operation.instance.mark_deleted(),
        }
    }
    Ok(())
}

fn stage(
    client: &dyn StoreClient,
    batch: &mut WriteBatch,
    operation: &BatchOperation<'_>,
) -> OdmResult<Outcome> {
    let instance = operation.instance();
    ensure_live(instance)?;
    let resolved = resolve_instance_collection(instance, None)?;

    match operation.kind {
        BatchKind::Create => {
            let (id, generated) = match instance.document_id() {
                Some(id) => {
                    validate_id(id)?;
                    (id.to_string(), false)
                }
                None => (client.new_document_id(&resolved.collection_path), true),
            };
            let data = instance.serialize(&SerializeOptions::for_save())?;
            batch.set(resolved.document_path(&id), data);
            Ok(Outcome {
                id: generated.then_some(id),
                parent_path: resolved.parent_path,
            })
        }
        BatchKind::Update => {
            let id = require_id(instance)?;
            let data = instance.serialize(&SerializeOptions::for_update())?;
            if data.is_empty() {
                log::debug!("Skipping empty update of {}", resolved.document_path(id));
            } else {
                batch.update(resolved.document_path(id), data);
            }
            Ok(Outcome {
                id: None,
                parent_path: None,
            })
        }
        BatchKind::Delete => {
            let id = require_id(instance)?;
            batch.delete(resolved.document_path(id));
            Ok(Outcome {
                id: None,
                parent_path: None,
            })
        }
    }
}
