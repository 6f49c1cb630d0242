use crate::collection::Document;
use crate::common::PATH_SEPARATOR;

/// A document read from the store.
///
/// `data` is `None` when nothing is stored at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    path: String,
    id: String,
    data: Option<Document>,
}

impl DocumentSnapshot {
    pub fn new(path: impl Into<String>, data: Option<Document>) -> Self {
        let path = path.into();
        let id = path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string();
        DocumentSnapshot { path, id, data }
    }

    /// Snapshot of a path with no document.
    pub fn missing(path: impl Into<String>) -> Self {
        DocumentSnapshot::new(path, None)
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full document path, e.g. `users/u1/posts/p1`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> Option<&Document> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Document> {
        self.data
    }

    /// Path of the collection holding the document.
    pub fn collection_path(&self) -> &str {
        self.path
            .rsplit_once(PATH_SEPARATOR)
            .map_or("", |(collection, _)| collection)
    }

    /// Path of the document owning the collection, `None` for top-level documents.
    pub fn parent_path(&self) -> Option<&str> {
        self.collection_path()
            .rsplit_once(PATH_SEPARATOR)
            .map(|(parent, _)| parent)
    }
}
