//! Portable query predicates.
//!
//! A predicate is a [`FieldFilter`]: a `(field, operator, value)` triple. It is built
//! from a [`FieldRef`], either one generated for a model field (`User::FIELDS.age`)
//! or one made from a string with [`field`]:
//!
//! ```rust,ignore
//! use firestore_odm::filter::field;
//!
//! let adults = User::FIELDS.age.gte(18);
//! let named = field("name").is_in(vec!["Alice", "Bob"]);
//! let tagged = Product::FIELDS.tags.array_contains("rust");
//! ```
//!
//! A query applies its filters conjunctively, in the order given. There is no `OR`.
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne`
//! - **Comparison**: `lt`, `lte`, `gt`, `gte`
//! - **Membership**: `is_in`, `not_in`
//! - **Array**: `array_contains`, `array_contains_any`

mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
