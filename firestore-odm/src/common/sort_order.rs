use std::fmt::{Display, Formatter};

/// Specifies the direction of one ordering key in a query.
///
/// A bare field in an ordering is ascending, which is also what the backing
/// store applies when no direction is sent.
///
/// ```text
/// let options = order_by(User::FIELDS.name, SortOrder::Descending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Smallest to largest
    #[default]
    Ascending,
    /// Largest to smallest
    Descending,
}

impl SortOrder {
    pub fn reverse(&self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ASCENDING"),
            SortOrder::Descending => write!(f, "DESCENDING"),
        }
    }
}
