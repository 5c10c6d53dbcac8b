//! Type registry: the closed variant set and each variant's property schema.
//!
//! Pure lookup data. Editors use it to know which fields are legal, the
//! update pipeline uses it to resolve defaults and check value domains.

mod kind;
mod schema;

pub use kind::ElementKind;
pub use schema::{Domain, FieldSpec, Schema, is_known_key, schema_for};
