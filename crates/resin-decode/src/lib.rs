//! # resin-decode — Document Decode Pipeline
//!
//! Turns serialized resource documents into hydrated object graphs, or
//! into structured error documents when field validation fails.
//!
//! ## Pipeline
//!
//! Every decode call runs the same stages:
//!
//! 1. **Parse** the input buffer with serde_json; malformed JSON is a
//!    fatal [`DecodeError::InvalidFormat`].
//! 2. **Shape gate**: the raw tree must conform to the structural shape
//!    of the operation's [`DocumentKind`] before any domain processing
//!    (pluggable through [`ShapeValidator`]).
//! 3. **Schema match**: the document's resource type is resolved against
//!    the admissible [`SchemaRegistry`](resin_schema::SchemaRegistry),
//!    first declaration wins.
//! 4. **Two-pass hydration**: pass 1 stages every writable field's
//!    filtered value into the
//!    [`DecodeContext`](resin_core::DecodeContext); pass 2 validates from
//!    the staged state (so validators can cross-check siblings) and
//!    applies values onto the mapped instance.
//! 5. **Relationship resolution** through the per-call
//!    [`ObjectIdentityCache`]: every mention of the same `(type, id)`
//!    within one call yields the identical
//!    [`Instance`](resin_core::Instance).
//!
//! Fatal conditions abort with a [`DecodeError`]; field-level validation
//! failures accumulate instead, and the call reports them through
//! [`Decoder::error_document`] after sweeping every field.

pub mod cache;
pub mod decoder;
pub mod document;
pub mod error;

// Re-export primary types.
pub use cache::ObjectIdentityCache;
pub use decoder::Decoder;
pub use document::{DefaultShapeValidator, DocumentKind, ShapeValidator};
pub use error::{DecodeError, ErrorDocument, ErrorObject, ErrorPointer, ErrorSource, FieldError};
