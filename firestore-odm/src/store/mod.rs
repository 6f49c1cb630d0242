//! Driver contract of the backing document store and an in-memory implementation.

mod client;
pub mod memory;
mod write_batch;

pub use client::*;
pub use write_batch::*;
