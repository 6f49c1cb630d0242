//! Backend queries and their construction from find requests.

mod builder;
mod query;

pub use builder::*;
pub use query::*;
