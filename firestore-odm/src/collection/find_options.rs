use crate::common::SortOrder;
use crate::filter::FieldRef;

/// One ordering key of a query: a field (wire name) and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    order: SortOrder,
}

impl OrderBy {
    pub fn new(field: &str, order: SortOrder) -> Self {
        OrderBy {
            field: field.to_string(),
            order,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

impl From<&str> for OrderBy {
    fn from(field: &str) -> Self {
        OrderBy::new(field, SortOrder::Ascending)
    }
}

impl From<String> for OrderBy {
    fn from(field: String) -> Self {
        OrderBy {
            field,
            order: SortOrder::Ascending,
        }
    }
}

impl From<FieldRef> for OrderBy {
    fn from(field: FieldRef) -> Self {
        field.asc()
    }
}

impl From<&FieldRef> for OrderBy {
    fn from(field: &FieldRef) -> Self {
        field.asc()
    }
}

impl From<(&str, SortOrder)> for OrderBy {
    fn from((field, order): (&str, SortOrder)) -> Self {
        OrderBy::new(field, order)
    }
}

impl From<(FieldRef, SortOrder)> for OrderBy {
    fn from((field, order): (FieldRef, SortOrder)) -> Self {
        OrderBy::new(field.name(), order)
    }
}

/// Ordering and pagination of a find.
///
/// Orderings apply in sequence, the first one being the primary key. `offset` skips
/// matches before `limit` caps the page. Stable pages need an explicit ordering.
///
/// ```rust,ignore
/// let page = order_by(User::FIELDS.age, SortOrder::Descending)
///     .then_by(User::FIELDS.name)
///     .offset(10)
///     .limit(5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

pub fn order_by(field: impl Into<OrderBy>, order: SortOrder) -> FindOptions {
    let field = field.into();
    FindOptions::new().order_by(OrderBy::new(field.field(), order))
}

pub fn skip_by(offset: u64) -> FindOptions {
    FindOptions::new().offset(offset)
}

pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions {
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Appends an ordering key. A bare field orders ascending.
    pub fn order_by(mut self, order: impl Into<OrderBy>) -> FindOptions {
        self.order_by.push(order.into());
        self
    }

    /// Alias of [`FindOptions::order_by`] that reads well for tie-breakers.
    pub fn then_by(self, order: impl Into<OrderBy>) -> FindOptions {
        self.order_by(order)
    }

    /// Appends every ordering key of `orders`, in sequence.
    pub fn order_by_all<I, O>(mut self, orders: I) -> FindOptions
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderBy>,
    {
        self.order_by.extend(orders.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> FindOptions {
        self.offset = Some(offset);
        self
    }

    pub fn orderings(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }
}
