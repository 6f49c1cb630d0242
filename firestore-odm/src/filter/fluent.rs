use crate::collection::OrderBy;
use crate::common::{SortOrder, Value, DOCUMENT_ID};
use crate::filter::{FieldFilter, FilterOp};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Creates a field reference from a runtime field path.
pub fn field(field_name: &str) -> FieldRef {
    FieldRef {
        name: Cow::Owned(field_name.to_string()),
    }
}

/// Query handle for one field of a model.
///
/// The handle carries the field's wire name (its alias, or its declared name), so
/// filters and orderings use the key actually stored. The implicit id field maps to
/// the store's document identifier sentinel. Derived models expose one per field
/// through their `FIELDS` table; instance values are read from the struct fields as
/// usual.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    name: Cow<'static, str>,
}

impl FieldRef {
    pub const fn new(name: &'static str) -> Self {
        FieldRef {
            name: Cow::Borrowed(name),
        }
    }

    /// Reference to the document identifier, for filtering and ordering by key.
    pub const fn document_id() -> Self {
        FieldRef::new(DOCUMENT_ID)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_document_id(&self) -> bool {
        self.name == DOCUMENT_ID
    }

    fn compare(&self, op: FilterOp, value: Value) -> FieldFilter {
        FieldFilter::new(self.name.to_string(), op, value)
    }

    #[inline]
    pub fn eq<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::Equal, value.into())
    }

    #[inline]
    pub fn ne<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::NotEqual, value.into())
    }

    #[inline]
    pub fn lt<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::LessThan, value.into())
    }

    #[inline]
    pub fn lte<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::LessThanOrEqual, value.into())
    }

    #[inline]
    pub fn gt<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::GreaterThan, value.into())
    }

    #[inline]
    pub fn gte<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::GreaterThanOrEqual, value.into())
    }

    pub fn is_in<T: Into<Value>>(&self, values: Vec<T>) -> FieldFilter {
        self.compare(FilterOp::In, Value::from_vec(values))
    }

    pub fn not_in<T: Into<Value>>(&self, values: Vec<T>) -> FieldFilter {
        self.compare(FilterOp::NotIn, Value::from_vec(values))
    }

    pub fn array_contains<T: Into<Value>>(&self, value: T) -> FieldFilter {
        self.compare(FilterOp::ArrayContains, value.into())
    }

    pub fn array_contains_any<T: Into<Value>>(&self, values: Vec<T>) -> FieldFilter {
        self.compare(FilterOp::ArrayContainsAny, Value::from_vec(values))
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.name(), SortOrder::Ascending)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.name(), SortOrder::Descending)
    }
}

impl Display for FieldRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
