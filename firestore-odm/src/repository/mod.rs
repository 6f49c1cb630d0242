//! Typed repositories over document models.
//!
//! A [`Repository`] reads and writes the documents of one model type. It resolves the
//! collection of every call from the model's declared parent and either the
//! repository's parent scope or the parent path cached on the instance:
//!
//! ```rust,ignore
//! let users = db.repository::<User>()?;
//! users.save(&mut alice).await?;
//!
//! // subcollection model: explicit parent
//! let posts = db.repository::<Post>()?;
//! posts.save_under(&mut post, &alice).await?;
//!
//! // or the path cached by the save above
//! post.title = "Edited".into();
//! posts.update(&mut post).await?;
//! ```
//!
//! # Operations
//!
//! - Create, update, delete (optionally cascading to every descendant document)
//! - Get and existence check by id, count with a native or degraded path
//! - Filtered, ordered and paginated streams, with projections and collection groups
//! - Atomic batches mixing several models through [`BatchOperation`]

mod batch;
mod cascade;
mod cursor;
mod repository;
mod subcollection;
#[cfg(test)]
pub(crate) mod test_models;

pub use batch::*;
pub(crate) use cascade::*;
pub use cursor::*;
pub use repository::*;
pub use subcollection::*;
