use crate::collection::Document;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{resolve_document_path, DocumentState, ModelDescriptor, Schema, SerializeOptions};

/// A model stored as documents of its own collection.
///
/// Derive it with `#[derive(DocumentModel)]`:
///
/// ```rust,ignore
/// #[derive(Debug, Default, Clone, DocumentModel)]
/// #[model(collection = "posts", parent = User)]
/// pub struct Post {
///     pub id: Option<String>,
///     pub meta: DocumentMeta,
///     pub title: String,
/// }
/// ```
pub trait DocumentModel: Schema {
    fn descriptor() -> &'static ModelDescriptor;
}

/// Object-safe view of a model instance of any type.
///
/// Batches mix instances of several models, and explicit parents are instances of a
/// different model than the one being written; both go through this trait.
pub trait DocumentInstance: Send + Sync {
    fn model_descriptor(&self) -> &'static ModelDescriptor;

    fn document_id(&self) -> Option<&str>;

    fn assign_id(&mut self, id: String);

    fn cached_parent_path(&self) -> Option<&str>;

    fn cache_parent_path(&mut self, parent_path: Option<String>);

    fn serialize(&self, options: &SerializeOptions) -> OdmResult<Document>;

    fn is_deleted(&self) -> bool;

    fn mark_deleted(&mut self);

    fn state(&self) -> DocumentState {
        if self.is_deleted() {
            DocumentState::Deleted
        } else if self.document_id().is_some() {
            DocumentState::Persisted
        } else {
            DocumentState::Unsaved
        }
    }
}

impl<T: DocumentModel> DocumentInstance for T {
    fn model_descriptor(&self) -> &'static ModelDescriptor {
        T::descriptor()
    }

    fn document_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }

    fn assign_id(&mut self, id: String) {
        self.set_id(id);
    }

    fn cached_parent_path(&self) -> Option<&str> {
        self.meta().and_then(|meta| meta.parent_path())
    }

    fn cache_parent_path(&mut self, parent_path: Option<String>) {
        if let Some(meta) = self.meta_mut() {
            meta.set_parent_path(parent_path);
        }
    }

    fn serialize(&self, options: &SerializeOptions) -> OdmResult<Document> {
        self.to_document(options)
    }

    fn is_deleted(&self) -> bool {
        self.meta().is_some_and(|meta| meta.is_deleted())
    }

    fn mark_deleted(&mut self) {
        if let Some(meta) = self.meta_mut() {
            meta.mark_deleted();
        }
    }
}

/// Fails with `DocumentDeleted` when the instance was deleted.
pub(crate) fn ensure_live(instance: &dyn DocumentInstance) -> OdmResult<()> {
    if instance.is_deleted() {
        let descriptor = instance.model_descriptor();
        log::error!(
            "{} {} has been deleted",
            descriptor.model_name(),
            instance.document_id().unwrap_or("<unsaved>")
        );
        return Err(OdmError::new(
            &format!("{} has been deleted", descriptor.model_name()),
            ErrorKind::DocumentDeleted,
        ));
    }
    Ok(())
}

/// An explicit parent, resolved to its model type and full document path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    descriptor: &'static ModelDescriptor,
    document_path: String,
}

impl ParentRef {
    /// Resolves `parent`'s document path. Fails with `MissingIdentifier` if the parent
    /// has no id and with `UnresolvedParent` if its own parent cannot be resolved.
    pub fn of(parent: &dyn DocumentInstance) -> OdmResult<ParentRef> {
        ensure_live(parent)?;
        Ok(ParentRef {
            descriptor: parent.model_descriptor(),
            document_path: resolve_document_path(parent)?,
        })
    }

    /// A parent known only by path, e.g. taken from a stored reference.
    pub fn from_path(descriptor: &'static ModelDescriptor, document_path: &str) -> OdmResult<ParentRef> {
        let segments = document_path.split('/').collect::<Vec<_>>();
        let valid = segments.len() >= 2
            && segments.len() % 2 == 0
            && segments.iter().all(|s| !s.is_empty())
            && segments[segments.len() - 2] == descriptor.collection_name();
        if !valid {
            log::error!(
                "{} is not a document path of {}",
                document_path,
                descriptor.model_name()
            );
            return Err(OdmError::new(
                &format!("{} is not a document path of {}", document_path, descriptor.model_name()),
                ErrorKind::InvalidPath,
            ));
        }
        Ok(ParentRef {
            descriptor,
            document_path: document_path.to_string(),
        })
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    pub fn document_path(&self) -> &str {
        &self.document_path
    }
}
