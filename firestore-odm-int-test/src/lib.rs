pub mod models;
pub mod test_util;
