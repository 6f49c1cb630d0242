//! Documents, snapshots and find options.
//!
//! A [`Document`] is the schemaless payload of one stored record. A
//! [`DocumentSnapshot`] is what the store returns for a path: the id, the full path
//! and the payload if the document exists.
//!
//! ```rust,ignore
//! use firestore_odm::doc;
//!
//! let doc = doc! { name: "Alice", tags: ["admin"] };
//! ```

mod document;
mod find_options;
mod snapshot;

pub use document::*;
pub use find_options::*;
pub use snapshot::*;
