//! Model metadata, the schema collaborator contract and path resolution.
//!
//! A model type carries a static [`ModelDescriptor`] (collection name, optional parent
//! type, declared fields). Instances carry their id and a [`DocumentMeta`] caching the
//! resolved parent path. The functions in this module compute collection and document
//! paths from those two sources and an optional explicit [`ParentRef`].

mod descriptor;
mod instance;
mod meta;
mod path;
mod registry;
mod schema;

pub use descriptor::*;
pub use instance::*;
pub use meta::*;
pub use path::*;
pub use registry::*;
pub use schema::*;
