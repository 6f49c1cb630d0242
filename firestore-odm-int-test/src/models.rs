use chrono::{DateTime, Utc};
use firestore_odm::model::DocumentMeta;
use firestore_odm_derive::{Convertible, DocumentModel, Projection};

#[derive(Debug, Clone, Default, PartialEq, Convertible)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Convertible)]
pub enum Role {
    #[default]
    Member,
    Moderator,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, DocumentModel)]
#[model(collection = "users")]
pub struct User {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub name: String,
    #[model(rename = "emailAddress")]
    pub email: Option<String>,
    #[model(default)]
    pub age: i64,
    #[model(default)]
    pub role: Role,
    pub address: Option<Address>,
    pub tags: Vec<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: &str, age: i64) -> Self {
        User {
            name: name.to_string(),
            age,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, DocumentModel)]
#[model(collection = "posts", parent = User)]
pub struct Post {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub title: String,
    #[model(rename = "likeCount", default)]
    pub likes: i64,
    #[model(default)]
    pub published: bool,
}

impl Post {
    pub fn new(title: &str) -> Self {
        Post {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, DocumentModel)]
#[model(collection = "comments", parent = Post)]
pub struct Comment {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub body: String,
    #[model(skip)]
    pub draft_note: String,
}

impl Comment {
    pub fn new(body: &str) -> Self {
        Comment {
            body: body.to_string(),
            ..Default::default()
        }
    }
}

/// Top-level model with a custom id field and no metadata.
#[derive(Debug, Clone, Default, PartialEq, DocumentModel)]
pub struct Setting {
    #[model(id)]
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Projection)]
pub struct UserSummary {
    pub id: Option<String>,
    pub name: String,
    #[model(rename = "emailAddress")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Projection)]
pub struct PostTitle {
    pub id: Option<String>,
    pub meta: DocumentMeta,
    pub title: String,
}
