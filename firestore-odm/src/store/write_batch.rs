use crate::collection::Document;
use crate::common::MAX_BATCH_SIZE;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::store::StoreClient;
use std::fmt::{Display, Formatter};

/// One staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set { path: String, data: Document },
    Update { path: String, data: Document },
    Delete { path: String },
}

impl WriteOp {
    pub fn path(&self) -> &str {
        match self {
            WriteOp::Set { path, .. } | WriteOp::Update { path, .. } | WriteOp::Delete { path } => {
                path
            }
        }
    }
}

impl Display for WriteOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Set { path, .. } => write!(f, "set({})", path),
            WriteOp::Update { path, .. } => write!(f, "update({})", path),
            WriteOp::Delete { path } => write!(f, "delete({})", path),
        }
    }
}

/// Writes staged for one atomic commit.
///
/// ```rust,ignore
/// let mut batch = WriteBatch::new();
/// batch.set("users/u1", doc! { name: "Alice" });
/// batch.delete("users/u2");
/// batch.commit(client.as_ref()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch { writes: Vec::new() }
    }

    pub fn set(&mut self, path: impl Into<String>, data: Document) {
        self.writes.push(WriteOp::Set {
            path: path.into(),
            data,
        });
    }

    pub fn update(&mut self, path: impl Into<String>, data: Document) {
        self.writes.push(WriteOp::Update {
            path: path.into(),
            data,
        });
    }

    pub fn delete(&mut self, path: impl Into<String>) {
        self.writes.push(WriteOp::Delete { path: path.into() });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }

    /// Commits every staged write in one call. An empty batch is not sent.
    pub async fn commit(self, client: &dyn StoreClient) -> OdmResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        if self.writes.len() > MAX_BATCH_SIZE {
            log::error!(
                "A batch holds at most {} writes, got {}",
                MAX_BATCH_SIZE,
                self.writes.len()
            );
            return Err(OdmError::new(
                &format!("A batch holds at most {} writes", MAX_BATCH_SIZE),
                ErrorKind::InvalidOperation,
            ));
        }
        log::debug!("Committing batch of {} writes", self.writes.len());
        client.commit(self.writes).await
    }
}
