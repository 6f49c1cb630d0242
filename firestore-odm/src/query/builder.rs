use crate::collection::FindOptions;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::filter::FieldFilter;
use crate::query::{Query, QueryTarget};

/// Translates a portable find request into a backend [`Query`].
///
/// Filters are applied in the caller's order, orderings in sequence (primary key
/// first), then the projection, offset and limit.
///
/// ```rust,ignore
/// let query = QueryBuilder::new(QueryTarget::Collection("users".into()))
///     .filters(&[User::FIELDS.age.gte(30)])
///     .options(&order_by(User::FIELDS.name, SortOrder::Ascending).limit(10))
///     .build()?;
/// ```
pub struct QueryBuilder<'a> {
    target: QueryTarget,
    filters: &'a [FieldFilter],
    projection: Option<Vec<String>>,
    options: Option<&'a FindOptions>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(target: QueryTarget) -> Self {
        QueryBuilder {
            target,
            filters: &[],
            projection: None,
            options: None,
        }
    }

    pub fn filters(mut self, filters: &'a [FieldFilter]) -> Self {
        self.filters = filters;
        self
    }

    /// Restricts returned fields to these wire names.
    pub fn projection(mut self, fields: Option<Vec<String>>) -> Self {
        self.projection = fields;
        self
    }

    pub fn options(mut self, options: &'a FindOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> OdmResult<Query> {
        let mut query = Query::new(self.target);
        for filter in self.filters {
            filter.validate()?;
            query = query.where_filter(filter.clone());
        }

        if let Some(options) = self.options {
            for order in options.orderings() {
                if order.field().is_empty() {
                    log::error!("Cannot order by an empty field name");
                    return Err(OdmError::new(
                        "Cannot order by an empty field name",
                        ErrorKind::FilterError,
                    ));
                }
                query = query.order_by(order.field(), order.order());
            }
        }

        if let Some(fields) = self.projection {
            query = query.select(fields);
        }

        if let Some(options) = self.options {
            if let Some(offset) = options.get_offset() {
                query = query.offset(offset);
            }
            if let Some(limit) = options.get_limit() {
                query = query.limit(limit);
            }
        }

        log::debug!("Built query {}", query);
        Ok(query)
    }
}
