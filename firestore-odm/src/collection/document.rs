use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, OdmError, OdmResult};
use indexmap::IndexMap;
use itertools::Itertools;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// The key-value payload of a stored document.
///
/// Keys keep insertion order, which is also the order in which serialized models emit
/// their fields. A key containing `.` addresses a nested map when written with
/// [`Document::put`] or read with [`Document::get_path`], matching field-path semantics
/// of partial updates.
///
/// ```rust,ignore
/// let mut doc = Document::new();
/// doc.put("name", "Alice")?;
/// doc.put("address.city", "Berlin")?;
/// assert_eq!(doc.get_path("address.city"), Some(&Value::from("Berlin")));
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Writes `value` at `key`. A dotted key creates or descends into nested maps.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> OdmResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(OdmError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key.contains(FIELD_SEPARATOR) {
            let segments: SmallVec<[&str; 4]> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&segments, value)
        } else {
            self.data.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Writes `value` under the literal `key`, without field-path interpretation.
    pub fn insert<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), value.into());
    }

    fn deep_put(&mut self, segments: &[&str], value: Value) -> OdmResult<()> {
        if segments.iter().any(|s| s.is_empty()) {
            log::error!("Invalid field path {}", segments.join("."));
            return Err(OdmError::new(
                &format!("Invalid field path {}", segments.join(".")),
                ErrorKind::InvalidOperation,
            ));
        }

        match segments {
            [] => Ok(()),
            [last] => {
                self.data.insert(last.to_string(), value);
                Ok(())
            }
            [head, rest @ ..] => {
                let entry = self
                    .data
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Map(Document::new()));
                if !matches!(entry, Value::Map(_)) {
                    *entry = Value::Map(Document::new());
                }
                match entry.as_document_mut() {
                    Some(nested) => nested.deep_put(rest, value),
                    None => Err(OdmError::new(
                        "Nested field is not a map",
                        ErrorKind::InternalError,
                    )),
                }
            }
        }
    }

    /// Returns the value stored under the literal `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the value at a dotted field path, descending into nested maps.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.data.get(path) {
            return Some(value);
        }

        let mut segments = path.split(FIELD_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.data.get(first)?;
        for segment in segments {
            current = current.as_document()?.data.get(segment)?;
        }
        Some(current)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Returns a copy holding only the given field paths that are present.
    pub fn select(&self, fields: &[String]) -> Document {
        let mut selected = Document::new();
        for field in fields {
            if let Some(value) = self.get_path(field) {
                // paths come from an existing document, so they are well formed
                let _ = selected.put(field, value.clone());
            }
        }
        selected
    }

    /// Applies every entry of `other` as a field-path write.
    pub fn merge(&mut self, other: &Document) -> OdmResult<()> {
        for (key, value) in other.iter() {
            self.put(key, value.clone())?;
        }
        Ok(())
    }

    fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        self.data.iter().sorted_by(|a, b| a.0.cmp(b.0)).collect()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        // maps compare key by key in key order, then by size
        self.sorted_entries().cmp(&other.sorted_entries())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(k, v)| format!("\"{}\": {}", k, v))
                .join(", ")
        )
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [`Document`] with JSON-like syntax.
///
/// ```rust,ignore
/// let user = doc! {
///     name: "Alice",
///     age: 30,
///     address: { city: "Berlin" },
///     tags: ["admin", "user"],
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.insert($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting values for [`doc!`].
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Map($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
