use crate::collection::Document;
use crate::common::{Convertible, Value};
use crate::errors::OdmResult;
use crate::model::{
    read_or_default, read_required, DocumentMeta, DocumentModel, FieldSpec, ModelDescriptor,
    Schema, SerializeOptions,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct User {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub name: String,
    pub email: Option<String>,
    pub age: i64,
}

static USER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("name"),
    FieldSpec::new("email").with_alias("emailAddress"),
    FieldSpec::new("age").with_default(),
];
static USER: ModelDescriptor = ModelDescriptor::new("User", "users", None, &USER_FIELDS);

impl User {
    pub fn new(name: &str, age: i64) -> Self {
        User {
            name: name.to_string(),
            age,
            ..Default::default()
        }
    }
}

impl Schema for User {
    fn fields() -> &'static [FieldSpec] {
        &USER_FIELDS
    }

    fn to_document(&self, options: &SerializeOptions) -> OdmResult<Document> {
        let mut doc = Document::new();
        options.write_field(&mut doc, &USER_FIELDS[0], self.name.to_value()?, None);
        options.write_field(&mut doc, &USER_FIELDS[1], self.email.to_value()?, None);
        options.write_field(&mut doc, &USER_FIELDS[2], self.age.to_value()?, Some(&Value::Integer(0)));
        Ok(doc)
    }

    fn from_document(document: &Document) -> OdmResult<Self> {
        Ok(User {
            id: None,
            meta: DocumentMeta::default(),
            name: read_required(document, &USER_FIELDS[0])?,
            email: read_required(document, &USER_FIELDS[1])?,
            age: read_or_default(document, &USER_FIELDS[2])?,
        })
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn meta(&self) -> Option<&DocumentMeta> {
        Some(&self.meta)
    }

    fn meta_mut(&mut self) -> Option<&mut DocumentMeta> {
        Some(&mut self.meta)
    }
}

impl DocumentModel for User {
    fn descriptor() -> &'static ModelDescriptor {
        &USER
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Post {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub title: String,
}

static POST_FIELDS: [FieldSpec; 1] = [FieldSpec::new("title")];
static POST: ModelDescriptor =
    ModelDescriptor::new("Post", "posts", Some(User::descriptor), &POST_FIELDS);

impl Post {
    pub fn new(title: &str) -> Self {
        Post {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

impl Schema for Post {
    fn fields() -> &'static [FieldSpec] {
        &POST_FIELDS
    }

    fn to_document(&self, options: &SerializeOptions) -> OdmResult<Document> {
        let mut doc = Document::new();
        options.write_field(&mut doc, &POST_FIELDS[0], self.title.to_value()?, None);
        Ok(doc)
    }

    fn from_document(document: &Document) -> OdmResult<Self> {
        Ok(Post {
            id: None,
            meta: DocumentMeta::default(),
            title: read_required(document, &POST_FIELDS[0])?,
        })
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn meta(&self) -> Option<&DocumentMeta> {
        Some(&self.meta)
    }

    fn meta_mut(&mut self) -> Option<&mut DocumentMeta> {
        Some(&mut self.meta)
    }
}

impl DocumentModel for Post {
    fn descriptor() -> &'static ModelDescriptor {
        &POST
    }
}

/// Projection of [`User`] without id or meta.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UserName {
    pub name: String,
}

static USER_NAME_FIELDS: [FieldSpec; 1] = [FieldSpec::new("name")];

impl Schema for UserName {
    fn fields() -> &'static [FieldSpec] {
        &USER_NAME_FIELDS
    }

    fn to_document(&self, options: &SerializeOptions) -> OdmResult<Document> {
        let mut doc = Document::new();
        options.write_field(&mut doc, &USER_NAME_FIELDS[0], self.name.to_value()?, None);
        Ok(doc)
    }

    fn from_document(document: &Document) -> OdmResult<Self> {
        Ok(UserName {
            name: read_required(document, &USER_NAME_FIELDS[0])?,
        })
    }
}
