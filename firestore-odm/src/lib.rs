//! # Firestore ODM - typed object-document mapping for hierarchical document stores
//!
//! `firestore_odm` maps Rust structs onto a Firestore-style store: named top-level
//! collections whose documents may own nested subcollections addressed by their
//! parent document path.
//!
//! ## Key Features
//!
//! - **Typed models**: `#[derive(DocumentModel)]` with a declared parent model for
//!   subcollections
//! - **Path resolution**: collection and document paths from an explicit parent, a
//!   cached parent path, or nothing for top-level models
//! - **Queries**: conjunctive filters built from field references, ordering,
//!   offset/limit pagination, projections and collection group queries
//! - **CRUD**: create-if-absent, partial updates, get, exists and a two-tier count
//! - **Cascade deletion**: every descendant document is deleted before its ancestors
//! - **Batches**: creates, updates and deletes over several models in one atomic commit
//! - **Pluggable store**: any [`store::StoreClient`]; an in-memory store ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use firestore_odm::database::Database;
//! use firestore_odm::store::memory::InMemoryStore;
//! use firestore_odm::model::DocumentMeta;
//! use firestore_odm_derive::{DocumentModel, Projection};
//!
//! #[derive(Debug, Default, DocumentModel)]
//! #[model(collection = "users")]
//! pub struct User {
//!     pub id: Option<String>,
//!     pub meta: DocumentMeta,
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! let db = Database::builder()
//!     .client(InMemoryStore::default())
//!     .register::<User>()
//!     .build()?;
//!
//! let users = db.repository::<User>()?;
//! let mut alice = User { name: "Alice".into(), age: 30, ..Default::default() };
//! users.save(&mut alice).await?;
//!
//! let adults = users
//!     .find(&[User::FIELDS.age.gte(18)])?
//!     .try_collect_all()
//!     .await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, snapshots and find options
//! - [`common`] - Values, conversions and shared constants
//! - [`database`] - The database handle handing out repositories
//! - [`database_builder`] - Builder binding a store client and the model registry
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Field references and filter descriptors
//! - [`model`] - Model metadata, schema contract and path resolution
//! - [`odm_config`] - Database configuration
//! - [`query`] - Backend queries and the query builder
//! - [`repository`] - Typed repositories, cascade deletion and batches
//! - [`store`] - Store client contract and the in-memory store

pub mod collection;
pub mod common;
pub mod database;
pub mod database_builder;
pub mod errors;
pub mod filter;
pub mod model;
pub mod odm_config;
pub mod query;
pub mod repository;
pub mod store;
