use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, OdmError, OdmResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Two-way conversion between a Rust value and a stored [`Value`].
///
/// Every field of a document model implements this trait; `#[derive(Convertible)]`
/// covers nested structs and unit enums.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> OdmResult<Value>;
    fn from_value(value: &Value) -> OdmResult<Self::Output>;
}

/// Converts a value into `T`, the form generated code calls.
pub fn from_value<T: Convertible<Output = T>>(value: &Value) -> OdmResult<T> {
    T::from_value(value)
}

pub(crate) fn mapping_error(expected: &str, value: &Value) -> OdmError {
    log::error!("Value {} is not {}", value, expected);
    OdmError::new(
        &format!("Expected {} but found {}", expected, value.type_name()),
        ErrorKind::ObjectMappingError,
    )
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        value.as_bool().ok_or_else(|| mapping_error("a boolean", value))
    }
}

macro_rules! convertible_integer {
    ($($t:ty),*) => {
        $(
            impl Convertible for $t {
                type Output = $t;

                fn to_value(&self) -> OdmResult<Value> {
                    Ok(Value::Integer(*self as i64))
                }

                fn from_value(value: &Value) -> OdmResult<Self> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(*i).map_err(|_| {
                            log::error!("Value {} is out of range for {}", i, stringify!($t));
                            OdmError::new(
                                &format!("Value {} is out of range for {}", i, stringify!($t)),
                                ErrorKind::ObjectMappingError,
                            )
                        }),
                        _ => Err(mapping_error(concat!("an ", stringify!($t)), value)),
                    }
                }
            }
        )*
    };
}

convertible_integer!(i8, i16, i32, i64, u8, u16, u32);

impl Convertible for u64 {
    type Output = u64;

    fn to_value(&self) -> OdmResult<Value> {
        i64::try_from(*self).map(Value::Integer).map_err(|_| {
            log::error!("Value {} does not fit a stored integer", self);
            OdmError::new(
                &format!("Value {} does not fit a stored integer", self),
                ErrorKind::ObjectMappingError,
            )
        })
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        match value {
            Value::Integer(i) => u64::try_from(*i).map_err(|_| mapping_error("a u64", value)),
            _ => Err(mapping_error("a u64", value)),
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::Double(*self))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        // integers widen, the store may hand back 30 for a stored 30.0
        value.as_f64().ok_or_else(|| mapping_error("a number", value))
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::Double(*self as f64))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| mapping_error("a number", value))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mapping_error("a string", value))
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::Timestamp(*self))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        value
            .as_timestamp()
            .copied()
            .ok_or_else(|| mapping_error("a timestamp", value))
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(Value::Map(self.clone()))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        value
            .as_document()
            .cloned()
            .ok_or_else(|| mapping_error("a map", value))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> OdmResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        Ok(value.clone())
    }
}

impl<T: Convertible<Output = T>> Convertible for Option<T> {
    type Output = Option<T>;

    fn to_value(&self) -> OdmResult<Value> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for Vec<T> {
    type Output = Vec<T>;

    fn to_value(&self) -> OdmResult<Value> {
        let items = self
            .iter()
            .map(Convertible::to_value)
            .collect::<OdmResult<Vec<Value>>>()?;
        Ok(Value::Array(items))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => Err(mapping_error("an array", value)),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for BTreeMap<String, T> {
    type Output = BTreeMap<String, T>;

    fn to_value(&self) -> OdmResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.insert(key.clone(), value.to_value()?);
        }
        Ok(Value::Map(doc))
    }

    fn from_value(value: &Value) -> OdmResult<Self> {
        match value {
            Value::Map(doc) => doc
                .iter()
                .map(|(k, v)| T::from_value(v).map(|t| (k.clone(), t)))
                .collect(),
            _ => Err(mapping_error("a map", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use chrono::TimeZone;

    #[test]
    fn integers_convert_within_range() {
        assert_eq!(42i32.to_value().unwrap(), Value::Integer(42));
        assert_eq!(i32::from_value(&Value::Integer(42)).unwrap(), 42);
        let err = u8::from_value(&Value::Integer(300)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn u64_rejects_values_beyond_i64() {
        assert!(u64::MAX.to_value().is_err());
        assert!(u64::from_value(&Value::Integer(-1)).is_err());
    }

    #[test]
    fn doubles_accept_integers() {
        assert_eq!(f64::from_value(&Value::Integer(3)).unwrap(), 3.0);
        assert_eq!(29.99f64.to_value().unwrap(), Value::Double(29.99));
    }

    #[test]
    fn strings_reject_other_types() {
        assert_eq!(String::from_value(&Value::from("a")).unwrap(), "a");
        assert!(String::from_value(&Value::Integer(1)).is_err());
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<String>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(&Value::from("x")).unwrap(),
            Some("x".to_string())
        );
        assert_eq!(None::<i64>.to_value().unwrap(), Value::Null);
    }

    #[test]
    fn vec_converts_each_item() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let value = tags.to_value().unwrap();
        assert_eq!(value, Value::from(vec!["a", "b"]));
        assert_eq!(Vec::<String>::from_value(&value).unwrap(), tags);
        assert!(Vec::<i64>::from_value(&Value::from(vec!["a"])).is_err());
    }

    #[test]
    fn timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(DateTime::<Utc>::from_value(&ts.to_value().unwrap()).unwrap(), ts);
    }

    #[test]
    fn btree_map_reads_documents() {
        let value = Value::Map(doc! { a: 1, b: 2 });
        let map = BTreeMap::<String, i64>::from_value(&value).unwrap();
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn from_value_helper_delegates() {
        let n: i64 = from_value(&Value::Integer(7)).unwrap();
        assert_eq!(n, 7);
    }
}
