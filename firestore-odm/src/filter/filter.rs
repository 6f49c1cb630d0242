use crate::common::Value;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use std::fmt::{Display, Formatter};

/// Comparison operator of a [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    NotIn,
    ArrayContains,
    ArrayContainsAny,
}

impl FilterOp {
    /// Operators whose operand is a list of candidates.
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn | FilterOp::ArrayContainsAny)
    }

    /// Ordering comparisons, which only match values of the operand's type.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOp::LessThan
                | FilterOp::LessThanOrEqual
                | FilterOp::GreaterThan
                | FilterOp::GreaterThanOrEqual
        )
    }

    /// Operators that never match a document lacking the field or holding null.
    pub fn is_negation(&self) -> bool {
        matches!(self, FilterOp::NotEqual | FilterOp::NotIn)
    }
}

impl Display for FilterOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::Equal => "==",
            FilterOp::NotEqual => "!=",
            FilterOp::GreaterThan => ">",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::ArrayContainsAny => "array-contains-any",
        };
        write!(f, "{}", symbol)
    }
}

/// One query predicate: `(field, operator, value)`.
///
/// Filters are plain values. They are built by comparing a [`crate::filter::FieldRef`],
/// handed to a query and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    field: String,
    op: FilterOp,
    value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Splits the filter into its triple.
    pub fn into_parts(self) -> (String, FilterOp, Value) {
        (self.field, self.op, self.value)
    }

    /// Checks the operand shape this operator needs.
    pub fn validate(&self) -> OdmResult<()> {
        if self.field.is_empty() {
            log::error!("Filter field name cannot be empty");
            return Err(OdmError::new(
                "Filter field name cannot be empty",
                ErrorKind::FilterError,
            ));
        }

        if self.op.takes_list() {
            match &self.value {
                Value::Array(items) if items.is_empty() => {
                    log::error!("Operator {} on {} requires a non-empty list", self.op, self.field);
                    return Err(OdmError::new(
                        &format!("Operator {} requires a non-empty list", self.op),
                        ErrorKind::FilterError,
                    ));
                }
                Value::Array(_) => {}
                other => {
                    log::error!("Operator {} requires a list but got {}", self.op, other);
                    return Err(OdmError::new(
                        &format!("Operator {} requires a list value", self.op),
                        ErrorKind::FilterError,
                    ));
                }
            }
        }

        if self.op.is_range() && self.value.is_null() {
            log::error!("Operator {} cannot compare against null", self.op);
            return Err(OdmError::new(
                &format!("Operator {} cannot compare against null", self.op),
                ErrorKind::FilterError,
            ));
        }
        Ok(())
    }

    /// Evaluates the predicate against the field's stored value, `None` when the
    /// document lacks the field.
    pub fn apply(&self, field_value: Option<&Value>) -> bool {
        let actual = match field_value {
            Some(value) => value,
            None => return false,
        };

        match self.op {
            FilterOp::Equal => actual == &self.value,
            FilterOp::NotEqual => !actual.is_null() && actual != &self.value,
            FilterOp::LessThan => actual.same_kind(&self.value) && actual < &self.value,
            FilterOp::LessThanOrEqual => actual.same_kind(&self.value) && actual <= &self.value,
            FilterOp::GreaterThan => actual.same_kind(&self.value) && actual > &self.value,
            FilterOp::GreaterThanOrEqual => {
                actual.same_kind(&self.value) && actual >= &self.value
            }
            FilterOp::In => self.candidates().iter().any(|c| c == actual),
            FilterOp::NotIn => !actual.is_null() && !self.candidates().iter().any(|c| c == actual),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|item| item == &self.value)),
            FilterOp::ArrayContainsAny => actual.as_array().is_some_and(|items| {
                let candidates = self.candidates();
                items.iter().any(|item| candidates.contains(item))
            }),
        }
    }

    fn candidates(&self) -> &[Value] {
        self.value.as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

impl Display for FieldFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field, self.op, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols() {
        let symbols: Vec<String> = [
            FilterOp::LessThan,
            FilterOp::LessThanOrEqual,
            FilterOp::Equal,
            FilterOp::NotEqual,
            FilterOp::GreaterThan,
            FilterOp::GreaterThanOrEqual,
            FilterOp::In,
            FilterOp::NotIn,
            FilterOp::ArrayContains,
            FilterOp::ArrayContainsAny,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(
            symbols,
            vec!["<", "<=", "==", "!=", ">", ">=", "in", "not-in", "array-contains", "array-contains-any"]
        );
    }

    #[test]
    fn equality_matches_across_numeric_types() {
        let filter = FieldFilter::new("age", FilterOp::Equal, 30);
        assert!(filter.apply(Some(&Value::Double(30.0))));
        assert!(!filter.apply(Some(&Value::Integer(31))));
        assert!(!filter.apply(None));
    }

    #[test]
    fn range_only_matches_same_kind() {
        let filter = FieldFilter::new("age", FilterOp::GreaterThanOrEqual, 30);
        assert!(filter.apply(Some(&Value::Integer(30))));
        assert!(filter.apply(Some(&Value::Integer(35))));
        assert!(!filter.apply(Some(&Value::Integer(25))));
        assert!(!filter.apply(Some(&Value::from("zzz"))));
    }

    #[test]
    fn not_equal_skips_missing_and_null() {
        let filter = FieldFilter::new("name", FilterOp::NotEqual, "Alice");
        assert!(filter.apply(Some(&Value::from("Bob"))));
        assert!(!filter.apply(Some(&Value::from("Alice"))));
        assert!(!filter.apply(Some(&Value::Null)));
        assert!(!filter.apply(None));
    }

    #[test]
    fn in_and_not_in() {
        let names = Value::from(vec!["Alice", "Bob"]);
        let is_in = FieldFilter::new("name", FilterOp::In, names.clone());
        let not_in = FieldFilter::new("name", FilterOp::NotIn, names);
        assert!(is_in.apply(Some(&Value::from("Bob"))));
        assert!(!is_in.apply(Some(&Value::from("Eve"))));
        assert!(not_in.apply(Some(&Value::from("Eve"))));
        assert!(!not_in.apply(Some(&Value::from("Alice"))));
        assert!(!not_in.apply(None));
    }

    #[test]
    fn array_operators() {
        let tags = Value::from(vec!["python", "programming"]);
        let contains = FieldFilter::new("tags", FilterOp::ArrayContains, "python");
        let contains_any =
            FieldFilter::new("tags", FilterOp::ArrayContainsAny, vec!["rust", "programming"]);
        assert!(contains.apply(Some(&tags)));
        assert!(contains_any.apply(Some(&tags)));
        assert!(!contains.apply(Some(&Value::from("python"))));
        assert!(!contains_any.apply(Some(&Value::from(vec!["go"]))));
    }

    #[test]
    fn validate_rejects_bad_operands() {
        assert!(FieldFilter::new("", FilterOp::Equal, 1).validate().is_err());
        assert!(FieldFilter::new("a", FilterOp::In, 1).validate().is_err());
        assert!(FieldFilter::new("a", FilterOp::In, Vec::<i32>::new()).validate().is_err());
        assert!(FieldFilter::new("a", FilterOp::In, (0..31).collect::<Vec<i32>>())
            .validate()
            .is_err());
        assert!(FieldFilter::new("a", FilterOp::LessThan, Value::Null).validate().is_err());
        assert!(FieldFilter::new("a", FilterOp::Equal, Value::Null).validate().is_ok());
        assert!(FieldFilter::new("a", FilterOp::NotIn, vec![1, 2]).validate().is_ok());
    }

    #[test]
    fn display_shows_triple() {
        let filter = FieldFilter::new("age", FilterOp::LessThan, 25);
        assert_eq!(filter.to_string(), "(age < 25)");
    }
}
