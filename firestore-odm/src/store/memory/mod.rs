//! In-memory document store.

mod config;
mod query_engine;
mod store;

pub use config::*;
pub use store::*;
