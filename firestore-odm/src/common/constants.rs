// document identifier sentinel understood by the store for key filters and ordering
pub const DOCUMENT_ID: &str = "__name__";

// path constants
pub const PATH_SEPARATOR: char = '/';
pub const FIELD_SEPARATOR: char = '.';

// store limits
pub const MAX_BATCH_SIZE: usize = 500;
pub const AUTO_ID_LENGTH: usize = 20;

// config defaults
pub const DEFAULT_PROJECT_ID: &str = "default-project";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
