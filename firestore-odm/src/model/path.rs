use crate::common::PATH_SEPARATOR;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{DocumentInstance, ModelDescriptor, ParentRef};
use smallvec::SmallVec;

type Segments<'a> = SmallVec<[&'a str; 8]>;

/// Output of collection path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCollection {
    pub collection_path: String,
    pub parent_path: Option<String>,
}

impl ResolvedCollection {
    pub fn document_path(&self, id: &str) -> String {
        join_path(&self.collection_path, id)
    }
}

pub fn join_path(base: &str, segment: &str) -> String {
    format!("{}{}{}", base, PATH_SEPARATOR, segment)
}

fn split_path(path: &str) -> Segments<'_> {
    path.split(PATH_SEPARATOR).collect()
}

/// Resolves the collection path of `descriptor`.
///
/// Top-level models live at their collection name. A model with a declared parent
/// lives under a parent document, taken from `explicit_parent` when given and
/// otherwise from `stored_parent_path`, which is trusted as-is. An explicit parent
/// always wins over a stored path.
pub fn resolve_collection(
    descriptor: &ModelDescriptor,
    explicit_parent: Option<&ParentRef>,
    stored_parent_path: Option<&str>,
) -> OdmResult<ResolvedCollection> {
    let parent_type = match descriptor.parent() {
        None => {
            if let Some(parent) = explicit_parent {
                log::error!(
                    "{} is a top-level model and cannot live under {}",
                    descriptor.model_name(),
                    parent.descriptor().model_name()
                );
                return Err(OdmError::new(
                    &format!(
                        "{} is a top-level model and cannot live under {}",
                        descriptor.model_name(),
                        parent.descriptor().model_name()
                    ),
                    ErrorKind::ParentTypeMismatch,
                ));
            }
            return Ok(ResolvedCollection {
                collection_path: descriptor.collection_name().to_string(),
                parent_path: None,
            });
        }
        Some(parent_type) => parent_type,
    };

    let parent_path = match (explicit_parent, stored_parent_path.filter(|p| !p.is_empty())) {
        (Some(parent), _) => {
            if parent.descriptor() != parent_type {
                log::error!(
                    "{} expects a parent {} but got {}",
                    descriptor.model_name(),
                    parent_type.model_name(),
                    parent.descriptor().model_name()
                );
                return Err(OdmError::new(
                    &format!(
                        "{} expects a parent {} but got {}",
                        descriptor.model_name(),
                        parent_type.model_name(),
                        parent.descriptor().model_name()
                    ),
                    ErrorKind::ParentTypeMismatch,
                ));
            }
            parent.document_path().to_string()
        }
        (None, Some(stored)) => stored.to_string(),
        (None, None) => {
            log::error!(
                "{} requires a parent {} but none was given or cached",
                descriptor.model_name(),
                parent_type.model_name()
            );
            return Err(OdmError::new(
                &format!(
                    "{} requires a parent {}: pass a parent or load the instance first",
                    descriptor.model_name(),
                    parent_type.model_name()
                ),
                ErrorKind::UnresolvedParent,
            ));
        }
    };

    Ok(ResolvedCollection {
        collection_path: join_path(&parent_path, descriptor.collection_name()),
        parent_path: Some(parent_path),
    })
}

/// Resolves the collection of an instance from an explicit parent or its cached path.
pub fn resolve_instance_collection(
    instance: &dyn DocumentInstance,
    explicit_parent: Option<&ParentRef>,
) -> OdmResult<ResolvedCollection> {
    resolve_collection(
        instance.model_descriptor(),
        explicit_parent,
        instance.cached_parent_path(),
    )
}

/// Full document path of a persisted instance.
pub fn resolve_document_path(instance: &dyn DocumentInstance) -> OdmResult<String> {
    let id = require_id(instance)?;
    let resolved = resolve_instance_collection(instance, None)?;
    Ok(resolved.document_path(id))
}

/// Returns the instance id or fails with `MissingIdentifier`.
pub fn require_id(instance: &dyn DocumentInstance) -> OdmResult<&str> {
    instance.document_id().ok_or_else(|| {
        log::error!(
            "Cannot get document path without an ID for {}",
            instance.model_descriptor().model_name()
        );
        OdmError::new(
            &format!(
                "Cannot get document path without an ID for {}",
                instance.model_descriptor().model_name()
            ),
            ErrorKind::MissingIdentifier,
        )
    })
}

/// Checks that `id` can name a document.
pub fn validate_id(id: &str) -> OdmResult<()> {
    let reserved = id.len() > 4 && id.starts_with("__") && id.ends_with("__");
    if id.is_empty() || id.contains(PATH_SEPARATOR) || id == "." || id == ".." || reserved {
        log::error!("Invalid document id {:?}", id);
        return Err(OdmError::new(
            &format!("Invalid document id {:?}", id),
            ErrorKind::InvalidId,
        ));
    }
    Ok(())
}

/// Derives the parent document path from a document's full path, as needed for
/// collection-group results.
///
/// Strips the trailing `/{collection}/{id}` and checks that the stripped collection is
/// the model's. Returns `None` for a top-level document. A depth that does not match
/// the declared parent chain is logged and the stripped path is kept.
pub fn parent_path_from_document_path(
    descriptor: &ModelDescriptor,
    document_path: &str,
) -> OdmResult<Option<String>> {
    let segments = split_path(document_path);
    if segments.len() < 2 || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
        log::error!("{} is not a document path", document_path);
        return Err(OdmError::new(
            &format!("{} is not a document path", document_path),
            ErrorKind::InvalidPath,
        ));
    }

    let collection = segments[segments.len() - 2];
    if collection != descriptor.collection_name() {
        log::error!(
            "Document {} is not in a {} collection",
            document_path,
            descriptor.collection_name()
        );
        return Err(OdmError::new(
            &format!(
                "Document {} is not in a {} collection",
                document_path,
                descriptor.collection_name()
            ),
            ErrorKind::InvalidPath,
        ));
    }

    let expected_segments = 2 * (descriptor.depth() + 1);
    if segments.len() != expected_segments {
        log::warn!(
            "Document {} has depth {} but {} declares depth {}",
            document_path,
            segments.len() / 2 - 1,
            descriptor.model_name(),
            descriptor.depth()
        );
    }

    let parent = &segments[..segments.len() - 2];
    if parent.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parent.join("/")))
    }
}
