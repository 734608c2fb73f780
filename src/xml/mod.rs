//! Runtime support for the generated shadow schema.
//!
//! [`de`] walks a document through quick-xml's namespace-resolving reader and
//! hands the generated decoders `(namespace URI, local name)` pairs. [`ser`]
//! wraps quick-xml's writer for the generated encoders.

pub mod de;
pub mod ser;
