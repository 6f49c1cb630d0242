#![recursion_limit = "128"]
//! # Firestore ODM Derive Macros
//!
//! Procedural macros generating the `firestore_odm` model traits.
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Converts nested structs to and from a map value, and unit enums to and from the
//! variant name.
//!
//! - **Supported for**: structs with named fields, enums with unit variants only
//! - **Container attribute**: `#[converter(ignored = "a, b")]` leaves fields out of
//!   the stored map and fills them with `Default::default()` when reading
//!
//! ```rust,ignore
//! use firestore_odm_derive::Convertible;
//!
//! #[derive(Convertible, Default)]
//! pub struct Address {
//!     pub street: String,
//!     pub city: String,
//! }
//!
//! #[derive(Convertible, Default)]
//! pub enum Status {
//!     #[default]
//!     Active,
//!     Suspended,
//! }
//! ```
//!
//! ### `DocumentModel`
//!
//! Makes a struct a persisted model: a static model descriptor, the schema
//! implementation used to write and read documents, and a `FIELDS` table of query
//! handles.
//!
//! - **Container attribute**: `#[model(collection = "posts", parent = User)]`. The
//!   collection defaults to the type name, `parent` names the owning model type.
//! - **Field attributes**: `#[model(id)]`, `#[model(meta)]`, `#[model(rename = "wire")]`,
//!   `#[model(default)]`, `#[model(skip)]`
//!
//! A field named `id` of type `Option<String>` is the identifier and a field named
//! `meta` of type `DocumentMeta` holds the cached parent path unless other fields are
//! marked.
//!
//! ```rust,ignore
//! use firestore_odm::model::DocumentMeta;
//! use firestore_odm_derive::DocumentModel;
//!
//! #[derive(Debug, Default, DocumentModel)]
//! #[model(collection = "posts", parent = User)]
//! pub struct Post {
//!     pub id: Option<String>,
//!     pub meta: DocumentMeta,
//!     pub title: String,
//!     #[model(rename = "likeCount", default)]
//!     pub likes: i64,
//! }
//!
//! let popular = posts.find(&[Post::FIELDS.likes.gte(100)])?;
//! ```
//!
//! ### `Projection`
//!
//! A read-only shape holding a subset of a model's fields, for `find_as`. Accepts the
//! same field attributes as `DocumentModel`; id and meta fields are optional.
//!
//! ## Error Messages
//!
//! Unsupported shapes (tuple structs, unions, generic models, data-carrying enum
//! variants) and malformed attributes are reported as compile errors on the type.

extern crate proc_macro;
mod convertible;
mod document_model;
mod fields;
mod projection;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::document_model::generate_model_for_struct;
use crate::projection::generate_projection_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `firestore_odm::common::Convertible`.
///
/// Structs become map values keyed by field name. Enums must only have unit variants
/// and are stored as the variant name.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_convertible_for_struct(&ast, data) {
            Ok(ts) => ts,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!("Failed to derive Convertible for struct '{}': {}", ast.ident, e),
            )
            .to_compile_error()
            .into(),
        },
        Data::Enum(ref data) => match generate_convertible_for_enum(&ast, data) {
            Ok(ts) => ts,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!("Failed to derive Convertible for enum '{}': {}", ast.ident, e),
            )
            .to_compile_error()
            .into(),
        },
        Data::Union(_) => syn::Error::new_spanned(
            &ast,
            format!(
                "Convertible cannot be derived for union '{}', use a struct or an enum",
                ast.ident
            ),
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `firestore_odm::model::DocumentModel` and its `Schema`.
///
/// Also generates `<Name>Fields` and the associated constant `<Name>::FIELDS` with
/// one `FieldRef` per stored field; the id field maps to the document id.
#[proc_macro_derive(DocumentModel, attributes(model))]
pub fn derive_document_model(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_model_for_struct(&ast, data) {
            Ok(ts) => ts,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!("Failed to derive DocumentModel for '{}': {}", ast.ident, e),
            )
            .to_compile_error()
            .into(),
        },
        _ => syn::Error::new_spanned(
            &ast,
            format!(
                "DocumentModel can only be derived for structs with named fields, '{}' is not one",
                ast.ident
            ),
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `firestore_odm::model::Schema` for a read-only projection.
#[proc_macro_derive(Projection, attributes(model))]
pub fn derive_projection(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_projection_for_struct(&ast, data) {
            Ok(ts) => ts,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!("Failed to derive Projection for '{}': {}", ast.ident, e),
            )
            .to_compile_error()
            .into(),
        },
        _ => syn::Error::new_spanned(
            &ast,
            format!(
                "Projection can only be derived for structs with named fields, '{}' is not one",
                ast.ident
            ),
        )
        .to_compile_error()
        .into(),
    }
}
