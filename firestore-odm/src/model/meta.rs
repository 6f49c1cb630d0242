use std::fmt::{Display, Formatter};

/// Lifecycle of a document instance.
///
/// `Unsaved` until an id is set, `Persisted` while it carries an id, `Deleted` once
/// removed. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unsaved,
    Persisted,
    Deleted,
}

impl Display for DocumentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentState::Unsaved => write!(f, "unsaved"),
            DocumentState::Persisted => write!(f, "persisted"),
            DocumentState::Deleted => write!(f, "deleted"),
        }
    }
}

/// Per-instance bookkeeping that is never written to the store.
///
/// Holds the resolved parent document path, cached when the instance is saved, loaded
/// or found, so that later updates and deletes do not need the parent again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    parent_path: Option<String>,
    deleted: bool,
}

impl DocumentMeta {
    pub fn new() -> Self {
        DocumentMeta::default()
    }

    /// Meta of an instance living under the parent document at `parent_path`.
    pub fn with_parent_path(parent_path: impl Into<String>) -> Self {
        DocumentMeta {
            parent_path: Some(parent_path.into()),
            deleted: false,
        }
    }

    pub fn parent_path(&self) -> Option<&str> {
        self.parent_path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn set_parent_path(&mut self, parent_path: Option<String>) {
        self.parent_path = parent_path;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}
