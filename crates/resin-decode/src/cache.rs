//! # Object Identity Cache
//!
//! Per-call map from `(mapped type, id)` to the already-materialized
//! [`Instance`], guaranteeing that every mention of the same resource
//! within one decode operation — primary resource or relationship target
//! — aliases the identical object. Consumers of the decoded graph can
//! rely on [`Instance::ptr_eq`] to detect "same entity".
//!
//! The cache is scoped strictly to one decode call and is reset at the
//! start of the next.

use std::any::TypeId;
use std::collections::HashMap;

use resin_core::Instance;
use resin_schema::ResourceSchema;

/// Identity map for one decode operation.
#[derive(Debug, Default)]
pub struct ObjectIdentityCache {
    entries: HashMap<(TypeId, String), Instance>,
}

impl ObjectIdentityCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached instances. Called at the start of every decode.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// The instance for `(schema's mapped type, id)`: the cached one when
    /// present, otherwise a fresh bare instance with the id assigned
    /// through the schema, cached for the rest of the call.
    pub fn resolve(&mut self, schema: &ResourceSchema, id: &str) -> Instance {
        let key = (schema.mapped_type(), id.to_owned());
        if let Some(cached) = self.entries.get(&key) {
            tracing::trace!(
                resource_type = %schema.resource_type(),
                id,
                "identity cache hit"
            );
            return cached.clone();
        }
        let instance = schema.create();
        schema.assign_id(&instance, id);
        self.entries.insert(key, instance.clone());
        instance
    }

    /// Number of distinct `(type, id)` pairs materialized so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been materialized yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct User {
        id: Option<String>,
    }

    #[derive(Debug, Default)]
    struct Tag {
        id: Option<String>,
    }

    fn user_schema() -> ResourceSchema {
        ResourceSchema::builder::<User>("users")
            .id(|user, id| user.id = Some(id.to_owned()))
            .build()
    }

    fn tag_schema() -> ResourceSchema {
        ResourceSchema::builder::<Tag>("tags")
            .id(|tag, id| tag.id = Some(id.to_owned()))
            .build()
    }

    #[test]
    fn miss_creates_instance_with_id_assigned() {
        let mut cache = ObjectIdentityCache::new();
        let schema = user_schema();
        let inst = cache.resolve(&schema, "1");
        assert_eq!(inst.borrow::<User>().unwrap().id.as_deref(), Some("1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn repeated_resolution_yields_identical_instance() {
        let mut cache = ObjectIdentityCache::new();
        let schema = user_schema();
        let first = cache.resolve(&schema, "1");
        let second = cache.resolve(&schema, "1");
        assert!(first.ptr_eq(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_ids_yield_distinct_instances() {
        let mut cache = ObjectIdentityCache::new();
        let schema = user_schema();
        let one = cache.resolve(&schema, "1");
        let two = cache.resolve(&schema, "2");
        assert!(!one.ptr_eq(&two));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn same_id_different_mapped_types_do_not_collide() {
        let mut cache = ObjectIdentityCache::new();
        let users = user_schema();
        let tags = tag_schema();
        let user = cache.resolve(&users, "1");
        let tag = cache.resolve(&tags, "1");
        assert!(!user.ptr_eq(&tag));
        assert!(user.is::<User>());
        assert!(tag.is::<Tag>());
    }

    #[test]
    fn reset_forgets_identities() {
        let mut cache = ObjectIdentityCache::new();
        let schema = user_schema();
        let before = cache.resolve(&schema, "1");
        cache.reset();
        assert!(cache.is_empty());
        let after = cache.resolve(&schema, "1");
        assert!(!before.ptr_eq(&after));
    }
}
