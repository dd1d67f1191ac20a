//! # resin-schema — Resource Schemas
//!
//! Static mapping descriptions between resource types on the wire and
//! mapped Rust types in memory. A [`ResourceSchema`] names its resource
//! type, carries ordered [`AttributeSpec`]s and [`RelationshipSpec`]s,
//! and knows how to create a fresh mapped instance and assign its
//! identifier — no reflection, just closures erased behind the schema.
//!
//! ## Design
//!
//! Schemas are built through a typed [`SchemaBuilder`]: field setters are
//! written against the concrete mapped type (`|article: &mut Article,
//! value| ...`) and the builder erases them at `build()`. Relationship
//! cardinality is a tagged sum ([`RelationshipSpec::ToOne`] /
//! [`RelationshipSpec::ToMany`]) dispatched by `match`.
//!
//! The [`SchemaRegistry`] holds the admissible schema set for a decode
//! operation, keyed both by resource-type string (declaration order,
//! first match wins) and by mapped-type identity.

pub mod attribute;
pub mod registry;
pub mod relationship;
pub mod schema;

// Re-export primary types.
pub use attribute::AttributeSpec;
pub use registry::{SchemaError, SchemaRegistry};
pub use relationship::{RelationshipSpec, ToManySpec, ToOneSpec};
pub use schema::{ResourceSchema, SchemaBuilder};
