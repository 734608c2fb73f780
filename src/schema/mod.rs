//! Shadow schema: the declaration table for the feed model and the
//! generator that derives the namespace-URI keyed shadow types from it.
//!
//! `quick-xml` only resolves prefixes through its namespace-aware reader, so
//! decoding cannot match `<atom:link>` against a field declared with the
//! `atom` prefix when the document binds that URI to some other prefix (or
//! to the default namespace). The generator rewrites every prefix in the
//! descriptor table to its URI from [`namespaces::NAMESPACES`] and emits:
//!
//! - a `ShadowX` struct per entity with the same fields and shapes,
//! - a URI-keyed decoder for each shadow struct,
//! - `From<ShadowX> for X`, the translation back to the domain model,
//! - a prefix-keyed encoder for each domain struct.
//!
//! `build.rs` runs [`generate`] over [`descriptors::FEED_SCHEMA`] and writes
//! the result to `$OUT_DIR/shadow.rs`. This module is compiled into both the
//! build script and the library, so it must not refer to `crate::` items.

pub mod descriptors;
mod generate;
pub mod namespaces;

pub use generate::generate;

use thiserror::Error;

/// Errors raised while generating the shadow schema.
///
/// These only occur at build time; generation stops at the first error and
/// no source is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A tag uses a prefix that has no entry in the namespace table.
    #[error("{entity}.{field}: namespace prefix `{prefix}` is not in the namespace table")]
    UnknownPrefix {
        entity: String,
        field: String,
        prefix: String,
    },

    /// A tag could not be split into name, optional prefix and flags.
    #[error("{entity}.{field}: malformed tag `{tag}`: {reason}")]
    MalformedTag {
        entity: String,
        field: String,
        tag: String,
        reason: String,
    },

    /// A field type is neither a scalar nor a declared entity.
    #[error("{entity}.{field}: unknown type `{ty}`")]
    UnknownType {
        entity: String,
        field: String,
        ty: String,
    },

    /// A field combines its type, shape and wire kind in an unsupported way.
    #[error("{entity}.{field}: {reason}")]
    InvalidShape {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("entity `{0}` is declared more than once")]
    DuplicateEntity(String),

    #[error("{entity}.{field} is declared more than once")]
    DuplicateField { entity: String, field: String },
}
