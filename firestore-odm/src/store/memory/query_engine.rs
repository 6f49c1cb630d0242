use crate::collection::{Document, DocumentSnapshot, OrderBy};
use crate::common::{SortOrder, Value, DOCUMENT_ID, PATH_SEPARATOR};
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::filter::{FieldFilter, FilterOp};
use crate::query::{Query, QueryTarget};
use itertools::Itertools;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Collection path of a document path: everything before the id.
pub(crate) fn collection_of(path: &str) -> &str {
    path.rsplit_once(PATH_SEPARATOR).map_or("", |(collection, _)| collection)
}

fn id_of(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

fn in_target(target: &QueryTarget, path: &str) -> bool {
    let collection = collection_of(path);
    match target {
        QueryTarget::Collection(collection_path) => collection == collection_path,
        QueryTarget::CollectionGroup(name) => {
            collection.rsplit(PATH_SEPARATOR).next() == Some(name.as_str())
        }
    }
}

fn references_path(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(PATH_SEPARATOR),
        Value::Array(items) => items.iter().any(references_path),
        _ => false,
    }
}

/// Value of `field` in a document. The document id sentinel reads as the id, or as
/// the full path when the operand is a path.
fn field_value<'a>(
    path: &'a str,
    doc: &'a Document,
    field: &str,
    operand: Option<&Value>,
) -> Option<Cow<'a, Value>> {
    if field == DOCUMENT_ID {
        let key = if operand.is_some_and(references_path) {
            path
        } else {
            id_of(path)
        };
        return Some(Cow::Owned(Value::String(key.to_string())));
    }
    doc.get_path(field).map(Cow::Borrowed)
}

fn matches(path: &str, doc: &Document, filter: &FieldFilter) -> bool {
    let value = field_value(path, doc, filter.field(), Some(filter.value()));
    filter.apply(value.as_deref())
}

/// Orderings applied to the query: the explicit ones, or else the fields of
/// inequality filters in filter order.
fn effective_orderings(query: &Query) -> Vec<OrderBy> {
    if !query.orderings().is_empty() {
        return query.orderings().to_vec();
    }
    query
        .filters()
        .iter()
        .filter(|f| f.op().is_range() || f.op().is_negation())
        .map(|f| f.field())
        .unique()
        .map(|field| OrderBy::new(field, SortOrder::Ascending))
        .collect()
}

fn compare(
    a: (&String, &Document),
    b: (&String, &Document),
    orderings: &[OrderBy],
) -> Ordering {
    for order in orderings {
        let left = field_value(a.0, a.1, order.field(), None);
        let right = field_value(b.0, b.1, order.field(), None);
        let ordering = left.cmp(&right);
        let ordering = match order.order() {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    // implicit last key: document path, in the direction of the last explicit key
    let by_path = a.0.cmp(b.0);
    match orderings.last().map(|o| o.order()) {
        Some(SortOrder::Descending) => by_path.reverse(),
        _ => by_path,
    }
}

/// Maximum number of operands of `in`, `not-in` and `array-contains-any`.
pub(crate) const MAX_DISJUNCTION_SIZE: usize = 30;

/// Rejects filter sets a Firestore backend refuses to run.
pub(crate) fn check_limits(query: &Query) -> OdmResult<()> {
    let filters = query.filters();
    for filter in filters {
        if let Value::Array(items) = filter.value() {
            if filter.op().takes_list() && items.len() > MAX_DISJUNCTION_SIZE {
                log::error!(
                    "Operator {} on {} accepts at most {} values, got {}",
                    filter.op(),
                    filter.field(),
                    MAX_DISJUNCTION_SIZE,
                    items.len()
                );
                return Err(OdmError::new(
                    &format!(
                        "Operator {} accepts at most {} values",
                        filter.op(),
                        MAX_DISJUNCTION_SIZE
                    ),
                    ErrorKind::FilterError,
                ));
            }
        }
    }

    let count = |ops: &[FilterOp]| filters.iter().filter(|f| ops.contains(&f.op())).count();

    if count(&[FilterOp::ArrayContains, FilterOp::ArrayContainsAny]) > 1 {
        log::error!("A query supports at most one array-contains or array-contains-any filter");
        return Err(OdmError::new(
            "A query supports at most one array-contains or array-contains-any filter",
            ErrorKind::FilterError,
        ));
    }

    let not_in = count(&[FilterOp::NotIn]);
    if not_in > 1 {
        log::error!("A query supports at most one not-in filter");
        return Err(OdmError::new(
            "A query supports at most one not-in filter",
            ErrorKind::FilterError,
        ));
    }

    if not_in == 1 && count(&[FilterOp::NotEqual]) > 0 {
        log::error!("A not-in filter cannot be combined with a != filter");
        return Err(OdmError::new(
            "A not-in filter cannot be combined with a != filter",
            ErrorKind::FilterError,
        ));
    }
    Ok(())
}

/// Runs `query` over `documents`, keyed by full document path.
pub(crate) fn execute(documents: &BTreeMap<String, Document>, query: &Query) -> Vec<DocumentSnapshot> {
    let orderings = effective_orderings(query);

    let mut matched: Vec<(&String, &Document)> = documents
        .iter()
        .filter(|(path, _)| in_target(query.target(), path))
        .filter(|(path, doc)| query.filters().iter().all(|f| matches(path, doc, f)))
        .filter(|(path, doc)| {
            orderings
                .iter()
                .all(|o| field_value(path, doc, o.field(), None).is_some())
        })
        .collect();

    matched.sort_by(|a, b| compare(*a, *b, &orderings));

    let offset = query.get_offset().unwrap_or(0) as usize;
    let limit = query.get_limit().map_or(usize::MAX, |l| l as usize);

    matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(path, doc)| {
            let data = match query.projection() {
                Some(fields) => doc.select(fields),
                None => doc.clone(),
            };
            DocumentSnapshot::new(path.clone(), Some(data))
        })
        .collect()
}
