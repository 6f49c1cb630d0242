use crate::collection::Document;
use crate::common::{Convertible, Value};
use crate::errors::{ErrorKind, OdmError, OdmResult};
use crate::model::{DocumentMeta, FieldSpec};

/// Controls how an instance is turned into a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Skip fields whose value is null.
    pub exclude_none: bool,
    /// Key fields by their alias instead of their declared name.
    pub by_alias: bool,
    /// Skip fields declared with a default whose value equals that default.
    pub exclude_defaults: bool,
    /// Restrict output to these declared field names.
    pub include: Option<Vec<String>>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            exclude_none: true,
            by_alias: true,
            exclude_defaults: false,
            include: None,
        }
    }
}

impl SerializeOptions {
    /// Every field, keyed by alias, nulls kept.
    pub fn full() -> Self {
        SerializeOptions {
            exclude_none: false,
            by_alias: true,
            exclude_defaults: false,
            include: None,
        }
    }

    /// Options used by `save` and batch creates: nulls skipped, defaults written.
    pub fn for_save() -> Self {
        SerializeOptions::default()
    }

    /// Options used by `update` and batch updates: only nulls skipped, so a field
    /// set back to its default is still written.
    pub fn for_update() -> Self {
        SerializeOptions::default()
    }

    pub fn exclude_none(mut self, exclude_none: bool) -> Self {
        self.exclude_none = exclude_none;
        self
    }

    pub fn by_alias(mut self, by_alias: bool) -> Self {
        self.by_alias = by_alias;
        self
    }

    pub fn exclude_defaults(mut self, exclude_defaults: bool) -> Self {
        self.exclude_defaults = exclude_defaults;
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    fn explicitly_included(&self, spec: &FieldSpec) -> bool {
        self.include
            .as_ref()
            .is_some_and(|fields| fields.iter().any(|f| f == spec.name()))
    }

    /// Returns `false` when the field is outside the `include` set.
    pub fn wants(&self, spec: &FieldSpec) -> bool {
        self.include.is_none() || self.explicitly_included(spec)
    }

    /// Writes one serialized field into `doc` unless the options exclude it.
    ///
    /// `default` is the serialized default of fields declared with one. Fields named
    /// in `include` are written even when they hold their default.
    pub fn write_field(
        &self,
        doc: &mut Document,
        spec: &FieldSpec,
        value: Value,
        default: Option<&Value>,
    ) {
        if !self.wants(spec) {
            return;
        }
        if self.exclude_none && value.is_null() {
            return;
        }
        if self.exclude_defaults
            && spec.has_default()
            && !self.explicitly_included(spec)
            && default.is_some_and(|d| d == &value)
        {
            return;
        }
        doc.insert(spec.wire_name(self.by_alias), value);
    }
}

/// Looks a field up by its alias first, then by its declared name.
pub fn read_field<'a>(doc: &'a Document, spec: &FieldSpec) -> Option<&'a Value> {
    spec.alias()
        .and_then(|alias| doc.get(alias))
        .or_else(|| doc.get(spec.name()))
}

/// Reads a field that may be absent from the stored document: absent fields decode
/// from null, so optional fields become `None` and required ones fail.
pub fn read_required<T: Convertible<Output = T>>(doc: &Document, spec: &FieldSpec) -> OdmResult<T> {
    match read_field(doc, spec) {
        Some(value) => T::from_value(value).map_err(|e| {
            OdmError::new_with_cause(
                &format!("Failed to read field {}", spec.name()),
                ErrorKind::ObjectMappingError,
                e,
            )
        }),
        None => T::from_value(&Value::Null).map_err(|_| {
            log::error!("Missing required field {}", spec.name());
            OdmError::new(
                &format!("Missing required field {}", spec.name()),
                ErrorKind::ObjectMappingError,
            )
        }),
    }
}

/// Reads a field declared with a default, falling back to it when absent.
pub fn read_or_default<T>(doc: &Document, spec: &FieldSpec) -> OdmResult<T>
where
    T: Convertible<Output = T> + Default,
{
    match read_field(doc, spec) {
        Some(value) => read_required(doc, spec).or_else(|e| {
            if value.is_null() {
                Ok(T::default())
            } else {
                Err(e)
            }
        }),
        None => Ok(T::default()),
    }
}

/// The schema collaborator: declared fields plus conversion to and from documents.
///
/// Implemented by `#[derive(DocumentModel)]` for models and `#[derive(Projection)]` for
/// projection types. The id and meta hooks default to no-ops, so a projection may
/// omit those fields; when present, loaded instances receive the document id and the
/// resolved parent path through them.
pub trait Schema: Sized + Send + Sync + 'static {
    fn fields() -> &'static [FieldSpec];

    fn to_document(&self, options: &SerializeOptions) -> OdmResult<Document>;

    fn from_document(document: &Document) -> OdmResult<Self>;

    fn id(&self) -> Option<&str> {
        None
    }

    fn set_id(&mut self, _id: String) {}

    fn meta(&self) -> Option<&DocumentMeta> {
        None
    }

    fn meta_mut(&mut self) -> Option<&mut DocumentMeta> {
        None
    }

    /// Wire names selected when this type is used as a projection.
    fn projection() -> Vec<String> {
        Self::fields()
            .iter()
            .map(|f| f.wire_name(true).to_string())
            .collect()
    }
}
