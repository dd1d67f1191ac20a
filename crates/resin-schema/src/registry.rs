//! # Schema Registry
//!
//! The [`SchemaRegistry`] holds the admissible schema set for a decode
//! operation, in declaration order. Resource-type resolution is a linear
//! scan where the first match wins — deterministic by construction — and
//! registration rejects duplicate resource-type strings outright, so the
//! "types must not collide" contract is enforced rather than assumed.

use std::any::TypeId;

use thiserror::Error;

use crate::schema::ResourceSchema;

/// Errors from schema registration and resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No registered schema declares the requested resource type.
    #[error("cannot resolve resource type '{0}'")]
    UnresolvedType(String),

    /// A schema with the same resource-type string is already registered.
    #[error("duplicate resource type '{0}'")]
    DuplicateType(String),
}

/// Ordered set of resource schemas, keyed by resource-type string and by
/// mapped-type identity.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<ResourceSchema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from schemas in declaration order.
    pub fn try_from_schemas(
        schemas: impl IntoIterator<Item = ResourceSchema>,
    ) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Append a schema, rejecting duplicate resource-type strings.
    pub fn register(&mut self, schema: ResourceSchema) -> Result<(), SchemaError> {
        if self.get(schema.resource_type()).is_some() {
            return Err(SchemaError::DuplicateType(
                schema.resource_type().to_owned(),
            ));
        }
        tracing::debug!(
            resource_type = %schema.resource_type(),
            mapped_type = schema.mapped_type_name(),
            "schema registered"
        );
        self.schemas.push(schema);
        Ok(())
    }

    /// First schema declaring `resource_type`, or `None`.
    pub fn get(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.resource_type() == resource_type)
    }

    /// First schema declaring `resource_type`, or
    /// [`SchemaError::UnresolvedType`].
    pub fn resolve_type(&self, resource_type: &str) -> Result<&ResourceSchema, SchemaError> {
        self.get(resource_type)
            .ok_or_else(|| SchemaError::UnresolvedType(resource_type.to_owned()))
    }

    /// First schema whose mapped type is `T`.
    pub fn schema_for<T: 'static>(&self) -> Option<&ResourceSchema> {
        self.schema_for_type_id(TypeId::of::<T>())
    }

    /// First schema with the given mapped-type identity.
    pub fn schema_for_type_id(&self, mapped_type: TypeId) -> Option<&ResourceSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.mapped_type() == mapped_type)
    }

    /// Schemas in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.schemas.iter()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Article;
    #[derive(Debug, Default)]
    struct User;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::try_from_schemas([
            ResourceSchema::builder::<Article>("articles").build(),
            ResourceSchema::builder::<User>("users").build(),
        ])
        .unwrap()
    }

    #[test]
    fn resolve_by_type_string() {
        let registry = registry();
        let schema = registry.resolve_type("users").unwrap();
        assert_eq!(schema.resource_type(), "users");
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = registry();
        let err = registry.resolve_type("ghosts").unwrap_err();
        assert_eq!(err, SchemaError::UnresolvedType("ghosts".to_owned()));
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(ResourceSchema::builder::<Article>("articles").build())
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("articles".to_owned()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_by_mapped_type() {
        let registry = registry();
        assert_eq!(
            registry.schema_for::<User>().unwrap().resource_type(),
            "users"
        );
        assert!(registry.schema_for::<String>().is_none());
    }

    #[test]
    fn declaration_order_scan() {
        let registry = registry();
        let types: Vec<_> = registry.iter().map(|s| s.resource_type()).collect();
        assert_eq!(types, ["articles", "users"]);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SchemaError::UnresolvedType("ghosts".into()).to_string(),
            "cannot resolve resource type 'ghosts'"
        );
        assert_eq!(
            SchemaError::DuplicateType("articles".into()).to_string(),
            "duplicate resource type 'articles'"
        );
    }
}
