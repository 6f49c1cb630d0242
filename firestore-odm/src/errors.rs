use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for object-document mapping operations.
///
/// Each kind names one category of failure so callers can tell "the document is not
/// there" (a clean `None`/`false`/empty result, never an error) apart from "the
/// operation could not run".
///
/// # Examples
///
/// ```rust,ignore
/// use firestore_odm::errors::{OdmError, ErrorKind, OdmResult};
///
/// fn example() -> OdmResult<()> {
///     Err(OdmError::new("Cannot update a document without an id", ErrorKind::MissingIdentifier))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Lifecycle Errors
    /// No backing client is bound, the database is closed or the model is not registered
    NotInitialized,
    /// The operation is not valid on an instance in the `Deleted` state
    DocumentDeleted,

    // Path Errors
    /// An operation needs a persisted id and the instance has none
    MissingIdentifier,
    /// A subcollection model has neither an explicit parent nor a cached parent path
    UnresolvedParent,
    /// An explicit parent instance is not of the declared parent model type
    ParentTypeMismatch,
    /// A subcollection accessor was bound to a parent its child type does not declare
    InvalidAccessorBinding,
    /// A document or collection path is malformed
    InvalidPath,
    /// The provided id cannot be used as a document id
    InvalidId,

    // Write Errors
    /// A create collided with an existing document
    AlreadyExists,
    /// An update targeted a document that does not exist
    NotFound,

    // Query Errors
    /// Error during filter construction or evaluation
    FilterError,

    // Mapping Errors
    /// Error mapping an instance to or from a document
    ObjectMappingError,

    // Backend Errors
    /// Any failure surfaced by the backing store client
    BackendFailure,
    /// The backing store does not offer an optional capability
    UnsupportedOperation,

    // Generic Errors
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotInitialized => write!(f, "Not initialized"),
            ErrorKind::DocumentDeleted => write!(f, "Document deleted"),
            ErrorKind::MissingIdentifier => write!(f, "Missing identifier"),
            ErrorKind::UnresolvedParent => write!(f, "Unresolved parent"),
            ErrorKind::ParentTypeMismatch => write!(f, "Parent type mismatch"),
            ErrorKind::InvalidAccessorBinding => write!(f, "Invalid accessor binding"),
            ErrorKind::InvalidPath => write!(f, "Invalid path"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::AlreadyExists => write!(f, "Already exists"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::BackendFailure => write!(f, "Backend failure"),
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for every fallible operation of the mapper.
///
/// `OdmError` carries a message, an [`ErrorKind`], an optional cause and the backtrace
/// captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use firestore_odm::errors::{OdmError, ErrorKind};
///
/// let cause = OdmError::new("connection reset", ErrorKind::BackendFailure);
/// let err = OdmError::new_with_cause("Failed to commit batch", ErrorKind::BackendFailure, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct OdmError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<OdmError>>,
    backtrace: Atomic<Backtrace>,
}

impl OdmError {
    /// Creates a new `OdmError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        OdmError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `OdmError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: OdmError) -> Self {
        OdmError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&OdmError> {
        self.cause.as_deref()
    }
}

impl Display for OdmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for OdmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => write!(f, "{} ({})\n{:?}", self.message, self.error_kind, self.backtrace.read()),
        }
    }
}

impl Error for OdmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, OdmError>`, returned by all fallible operations.
pub type OdmResult<T> = Result<T, OdmError>;

#[cfg(feature = "serde")]
impl serde::de::Error for OdmError {
    fn custom<T: Display>(msg: T) -> Self {
        OdmError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for OdmError {
    fn custom<T: Display>(msg: T) -> Self {
        OdmError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::fmt::Error> for OdmError {
    fn from(err: std::fmt::Error) -> Self {
        OdmError::new(&format!("Formatting error: {}", err), ErrorKind::InternalError)
    }
}

impl From<String> for OdmError {
    fn from(msg: String) -> Self {
        OdmError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for OdmError {
    fn from(msg: &str) -> Self {
        OdmError::new(msg, ErrorKind::InternalError)
    }
}
