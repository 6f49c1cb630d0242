use crate::collection::OrderBy;
use crate::common::SortOrder;
use crate::filter::FieldFilter;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// What a query reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// One collection, by full path.
    Collection(String),
    /// Every collection with this name, under any parent.
    CollectionGroup(String),
}

impl QueryTarget {
    /// The collection name every matched document sits in.
    pub fn collection_name(&self) -> &str {
        match self {
            QueryTarget::Collection(path) => path.rsplit('/').next().unwrap_or(path),
            QueryTarget::CollectionGroup(name) => name,
        }
    }
}

impl Display for QueryTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTarget::Collection(path) => write!(f, "collection({})", path),
            QueryTarget::CollectionGroup(name) => write!(f, "collection_group({})", name),
        }
    }
}

/// A backend query: a target plus conjunctive filters, orderings, projection and
/// pagination. Mirrors the handle a store client exposes for `where`, `order_by`,
/// `select`, `offset` and `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    target: QueryTarget,
    filters: Vec<FieldFilter>,
    order_by: Vec<OrderBy>,
    select: Option<Vec<String>>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new(target: QueryTarget) -> Self {
        Query {
            target,
            filters: Vec::new(),
            order_by: Vec::new(),
            select: None,
            limit: None,
            offset: None,
        }
    }

    pub fn collection(path: impl Into<String>) -> Self {
        Query::new(QueryTarget::Collection(path.into()))
    }

    pub fn collection_group(name: impl Into<String>) -> Self {
        Query::new(QueryTarget::CollectionGroup(name.into()))
    }

    pub fn where_filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push(OrderBy::new(field, order));
        self
    }

    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.select = Some(fields);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn orderings(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Projected fields. `Some(vec![])` selects no fields, only document ids.
    pub fn projection(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target)?;
        for filter in &self.filters {
            write!(f, ".where{}", filter)?;
        }
        for order in &self.order_by {
            write!(f, ".order_by({}, {})", order.field(), order.order())?;
        }
        if let Some(select) = &self.select {
            write!(f, ".select([{}])", select.iter().join(", "))?;
        }
        if let Some(offset) = self.offset {
            write!(f, ".offset({})", offset)?;
        }
        if let Some(limit) = self.limit {
            write!(f, ".limit({})", limit)?;
        }
        Ok(())
    }
}
