//! # Resource Schemas & the Typed Builder
//!
//! A [`ResourceSchema`] is the static mapping description for one
//! resource type: the type string on the wire, the mapped Rust type's
//! identity, ordered field descriptors, a factory producing fresh
//! zero-valued instances, and the identifier-assignment closure. The
//! mapped type is erased at [`SchemaBuilder::build`]; everything the
//! decoder needs afterwards goes through the erased closures.

use std::any::{type_name, TypeId};
use std::marker::PhantomData;

use resin_core::Instance;

use crate::attribute::AttributeSpec;
use crate::relationship::RelationshipSpec;

/// Static mapping description between a resource type and a mapped Rust
/// type.
pub struct ResourceSchema {
    resource_type: String,
    mapped_type: TypeId,
    mapped_type_name: &'static str,
    create: Box<dyn Fn() -> Instance>,
    assign_id: Box<dyn Fn(&Instance, &str)>,
    attributes: Vec<AttributeSpec>,
    relationships: Vec<RelationshipSpec>,
}

impl ResourceSchema {
    /// Start building a schema mapping `resource_type` onto `T`.
    pub fn builder<T: Default + 'static>(resource_type: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder {
            resource_type: resource_type.into(),
            assign_id: None,
            attributes: Vec::new(),
            relationships: Vec::new(),
            _mapped: PhantomData,
        }
    }

    /// The resource-type string this schema matches on the wire.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Identity of the mapped Rust type.
    pub fn mapped_type(&self) -> TypeId {
        self.mapped_type
    }

    /// Name of the mapped Rust type, for diagnostics only.
    pub fn mapped_type_name(&self) -> &'static str {
        self.mapped_type_name
    }

    /// Create a fresh, zero-valued mapped instance.
    pub fn create(&self) -> Instance {
        (self.create)()
    }

    /// Assign an identifier onto a mapped instance.
    pub fn assign_id(&self, instance: &Instance, id: &str) {
        (self.assign_id)(instance, id);
    }

    /// The attribute descriptors, in declaration order.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// The relationship descriptors, in declaration order.
    pub fn relationships(&self) -> &[RelationshipSpec] {
        &self.relationships
    }
}

impl std::fmt::Debug for ResourceSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSchema")
            .field("resource_type", &self.resource_type)
            .field("mapped_type_name", &self.mapped_type_name)
            .field("attributes", &self.attributes)
            .field("relationships", &self.relationships)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ResourceSchema`], typed over the mapped type until
/// [`build`](Self::build) erases it.
pub struct SchemaBuilder<T> {
    resource_type: String,
    assign_id: Option<Box<dyn Fn(&mut T, &str)>>,
    attributes: Vec<AttributeSpec>,
    relationships: Vec<RelationshipSpec>,
    _mapped: PhantomData<T>,
}

impl<T: Default + 'static> SchemaBuilder<T> {
    /// Install the identifier-assignment closure. A schema without one
    /// cannot record ids on instances materialized for it (the decoder
    /// warns when that happens), so every schema that can be a
    /// relationship target or decoded with a known id should set this.
    pub fn id(mut self, assign: impl Fn(&mut T, &str) + 'static) -> Self {
        self.assign_id = Some(Box::new(assign));
        self
    }

    /// Append an attribute descriptor. Declaration order is hydration
    /// order.
    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    /// Append a relationship descriptor. Declaration order is hydration
    /// order.
    pub fn relationship(mut self, spec: impl Into<RelationshipSpec>) -> Self {
        self.relationships.push(spec.into());
        self
    }

    /// Erase the mapped type and produce the schema.
    pub fn build(self) -> ResourceSchema {
        let resource_type = self.resource_type;
        let assign_id = self.assign_id;
        let id_type = resource_type.clone();
        ResourceSchema {
            resource_type,
            mapped_type: TypeId::of::<T>(),
            mapped_type_name: type_name::<T>(),
            create: Box::new(|| Instance::new(T::default())),
            assign_id: Box::new(move |instance, id| match (&assign_id, instance.borrow_mut::<T>())
            {
                (Some(assign), Some(mut mapped)) => assign(&mut mapped, id),
                (None, _) => tracing::warn!(
                    resource_type = %id_type,
                    "schema has no identifier assignment; id dropped"
                ),
                (_, None) => tracing::warn!(
                    resource_type = %id_type,
                    "id assignment skipped: instance does not hold the schema's mapped type"
                ),
            }),
            attributes: self.attributes,
            relationships: self.relationships,
        }
    }
}
