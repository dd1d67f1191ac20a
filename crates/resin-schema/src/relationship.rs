//! # Relationship Field Descriptors
//!
//! Relationships come in two cardinalities with different validation and
//! mutation shapes, so the descriptor is a tagged sum:
//! [`RelationshipSpec::ToOne`] assigns/clears a single reference, while
//! [`RelationshipSpec::ToMany`] builds a collection incrementally through
//! add-item and clear-collection operations. Pass 2 of hydration
//! dispatches on the variant with a `match`.

use resin_core::{Access, DecodeContext, Instance, ResourceIdentifier, ValidationResult};

/// Validator signature for to-one relationships: the staged reference
/// (`None` for an explicit `data: null`) plus the decode context.
pub type ToOneValidator = dyn Fn(Option<&ResourceIdentifier>, &DecodeContext) -> ValidationResult;

/// Validator signature for to-many relationships: the full staged
/// reference list plus the decode context.
pub type ToManyValidator = dyn Fn(&[ResourceIdentifier], &DecodeContext) -> ValidationResult;

/// Descriptor for one relationship field, tagged by cardinality.
#[derive(Debug)]
pub enum RelationshipSpec {
    /// Single reference; assigning `None` clears it.
    ToOne(ToOneSpec),
    /// Reference collection; built by add-item / clear-collection.
    ToMany(ToManySpec),
}

impl RelationshipSpec {
    /// The document key, independent of cardinality.
    pub fn key(&self) -> &str {
        match self {
            Self::ToOne(spec) => spec.key(),
            Self::ToMany(spec) => spec.key(),
        }
    }

    /// The access mode, independent of cardinality.
    pub fn access(&self) -> Access {
        match self {
            Self::ToOne(spec) => spec.access(),
            Self::ToMany(spec) => spec.access(),
        }
    }
}

impl From<ToOneSpec> for RelationshipSpec {
    fn from(spec: ToOneSpec) -> Self {
        Self::ToOne(spec)
    }
}

impl From<ToManySpec> for RelationshipSpec {
    fn from(spec: ToManySpec) -> Self {
        Self::ToMany(spec)
    }
}

// ---------------------------------------------------------------------------
// ToOneSpec
// ---------------------------------------------------------------------------

/// Descriptor for a to-one relationship field.
pub struct ToOneSpec {
    key: String,
    access: Access,
    required: bool,
    validate_if_empty: bool,
    expected_types: Vec<String>,
    validator: Option<Box<ToOneValidator>>,
    assign: Box<dyn Fn(&Instance, Option<Instance>)>,
}

impl ToOneSpec {
    /// Create a spec for `key` accepting targets of the given resource
    /// types, with a typed assign closure. Assigning `None` clears the
    /// reference on the mapped instance.
    pub fn new<T, F>(
        key: impl Into<String>,
        expected_types: impl IntoIterator<Item = impl Into<String>>,
        assign: F,
    ) -> Self
    where
        T: 'static,
        F: Fn(&mut T, Option<Instance>) + 'static,
    {
        let key = key.into();
        let assign_key = key.clone();
        Self {
            key,
            access: Access::default(),
            required: false,
            validate_if_empty: false,
            expected_types: expected_types.into_iter().map(Into::into).collect(),
            validator: None,
            assign: Box::new(move |instance, target| match instance.borrow_mut::<T>() {
                Some(mut mapped) => assign(&mut mapped, target),
                None => tracing::warn!(
                    key = %assign_key,
                    "to-one assign skipped: instance does not hold the schema's mapped type"
                ),
            }),
        }
    }

    /// Mark this relationship as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the access mode (read-write by default).
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Run the validator even when the staged reference is null.
    pub fn validate_if_empty(mut self) -> Self {
        self.validate_if_empty = true;
        self
    }

    /// Install a validator.
    pub fn with_validator(
        mut self,
        validator: impl Fn(Option<&ResourceIdentifier>, &DecodeContext) -> ValidationResult + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// The document key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The access mode.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the relationship must be present and non-null.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a null staged reference still goes through the validator.
    pub fn validates_if_empty(&self) -> bool {
        self.validate_if_empty
    }

    /// Whether `resource_type` is an acceptable target type.
    pub fn expects_type(&self, resource_type: &str) -> bool {
        self.expected_types.iter().any(|t| t == resource_type)
    }

    /// The acceptable target resource types, in declaration order.
    pub fn expected_types(&self) -> &[String] {
        &self.expected_types
    }

    /// Run the validator; a spec without one accepts everything.
    pub fn validate(
        &self,
        reference: Option<&ResourceIdentifier>,
        ctx: &DecodeContext,
    ) -> ValidationResult {
        match &self.validator {
            Some(validator) => validator(reference, ctx),
            None => ValidationResult::ok(),
        }
    }

    /// Assign (or clear, with `None`) the reference on the mapped instance.
    pub fn assign(&self, instance: &Instance, target: Option<Instance>) {
        (self.assign)(instance, target);
    }
}

impl std::fmt::Debug for ToOneSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToOneSpec")
            .field("key", &self.key)
            .field("access", &self.access)
            .field("required", &self.required)
            .field("validate_if_empty", &self.validate_if_empty)
            .field("expected_types", &self.expected_types)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ToManySpec
// ---------------------------------------------------------------------------

/// Descriptor for a to-many relationship field.
pub struct ToManySpec {
    key: String,
    access: Access,
    required: bool,
    validate_if_empty: bool,
    expected_types: Vec<String>,
    validator: Option<Box<ToManyValidator>>,
    push: Box<dyn Fn(&Instance, Instance)>,
    clear: Box<dyn Fn(&Instance)>,
}

impl ToManySpec {
    /// Create a spec for `key` accepting targets of the given resource
    /// types, with typed add-item and clear-collection closures. There is
    /// no whole-collection setter; hydration clears and then adds.
    pub fn new<T, FPush, FClear>(
        key: impl Into<String>,
        expected_types: impl IntoIterator<Item = impl Into<String>>,
        push: FPush,
        clear: FClear,
    ) -> Self
    where
        T: 'static,
        FPush: Fn(&mut T, Instance) + 'static,
        FClear: Fn(&mut T) + 'static,
    {
        let key = key.into();
        let push_key = key.clone();
        let clear_key = key.clone();
        Self {
            key,
            access: Access::default(),
            required: false,
            validate_if_empty: false,
            expected_types: expected_types.into_iter().map(Into::into).collect(),
            validator: None,
            push: Box::new(move |instance, target| match instance.borrow_mut::<T>() {
                Some(mut mapped) => push(&mut mapped, target),
                None => tracing::warn!(
                    key = %push_key,
                    "to-many add skipped: instance does not hold the schema's mapped type"
                ),
            }),
            clear: Box::new(move |instance| match instance.borrow_mut::<T>() {
                Some(mut mapped) => clear(&mut mapped),
                None => tracing::warn!(
                    key = %clear_key,
                    "to-many clear skipped: instance does not hold the schema's mapped type"
                ),
            }),
        }
    }

    /// Mark this relationship as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the access mode (read-write by default).
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Run the validator even when the staged list is empty and the field
    /// was absent from the document.
    pub fn validate_if_empty(mut self) -> Self {
        self.validate_if_empty = true;
        self
    }

    /// Install a validator over the full staged reference list.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&[ResourceIdentifier], &DecodeContext) -> ValidationResult + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// The document key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The access mode.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the relationship must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether an absent field still goes through the validator.
    pub fn validates_if_empty(&self) -> bool {
        self.validate_if_empty
    }

    /// Whether `resource_type` is an acceptable target type.
    pub fn expects_type(&self, resource_type: &str) -> bool {
        self.expected_types.iter().any(|t| t == resource_type)
    }

    /// The acceptable target resource types, in declaration order.
    pub fn expected_types(&self) -> &[String] {
        &self.expected_types
    }

    /// Run the validator; a spec without one accepts everything.
    pub fn validate(
        &self,
        references: &[ResourceIdentifier],
        ctx: &DecodeContext,
    ) -> ValidationResult {
        match &self.validator {
            Some(validator) => validator(references, ctx),
            None => ValidationResult::ok(),
        }
    }

    /// Add one resolved target to the mapped collection.
    pub fn push(&self, instance: &Instance, target: Instance) {
        (self.push)(instance, target);
    }

    /// Clear the mapped collection.
    pub fn clear(&self, instance: &Instance) {
        (self.clear)(instance);
    }
}

impl std::fmt::Debug for ToManySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToManySpec")
            .field("key", &self.key)
            .field("access", &self.access)
            .field("required", &self.required)
            .field("validate_if_empty", &self.validate_if_empty)
            .field("expected_types", &self.expected_types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Article {
        author: Option<Instance>,
        tags: Vec<Instance>,
    }

    #[derive(Debug, Default)]
    struct User {
        id: Option<String>,
    }

    fn author_spec() -> ToOneSpec {
        ToOneSpec::new(
            "author",
            ["users"],
            |article: &mut Article, target| article.author = target,
        )
    }

    fn tags_spec() -> ToManySpec {
        ToManySpec::new(
            "tags",
            ["tags"],
            |article: &mut Article, target| article.tags.push(target),
            |article: &mut Article| article.tags.clear(),
        )
    }

    #[test]
    fn to_one_assign_and_clear() {
        let spec = author_spec();
        let article = Instance::new(Article::default());
        let user = Instance::new(User {
            id: Some("1".into()),
        });

        spec.assign(&article, Some(user.clone()));
        assert!(article
            .borrow::<Article>()
            .unwrap()
            .author
            .as_ref()
            .unwrap()
            .ptr_eq(&user));

        spec.assign(&article, None);
        assert!(article.borrow::<Article>().unwrap().author.is_none());
    }

    #[test]
    fn to_many_push_and_clear() {
        let spec = tags_spec();
        let article = Instance::new(Article::default());

        spec.push(&article, Instance::new(User::default()));
        spec.push(&article, Instance::new(User::default()));
        assert_eq!(article.borrow::<Article>().unwrap().tags.len(), 2);

        spec.clear(&article);
        assert!(article.borrow::<Article>().unwrap().tags.is_empty());
    }

    #[test]
    fn expected_type_matching() {
        let spec = ToOneSpec::new(
            "owner",
            ["users", "organizations"],
            |_: &mut Article, _| {},
        );
        assert!(spec.expects_type("users"));
        assert!(spec.expects_type("organizations"));
        assert!(!spec.expects_type("ghosts"));
    }

    #[test]
    fn sum_type_exposes_common_accessors() {
        let one: RelationshipSpec = author_spec().required().into();
        let many: RelationshipSpec = tags_spec().into();
        assert_eq!(one.key(), "author");
        assert_eq!(many.key(), "tags");
        assert_eq!(one.access(), Access::ReadWrite);
    }

    #[test]
    fn to_one_validator_sees_reference_and_context() {
        let spec = author_spec().with_validator(|reference, _ctx| match reference {
            Some(ident) if ident.id.is_empty() => ValidationResult::fail("empty id"),
            _ => ValidationResult::ok(),
        });
        let ctx = DecodeContext::new();
        let bad = ResourceIdentifier::new("users", "");
        assert!(!spec.validate(Some(&bad), &ctx).is_valid());
        assert!(spec.validate(None, &ctx).is_valid());
    }

    #[test]
    fn to_many_validator_sees_full_list() {
        let spec = tags_spec().with_validator(|refs, _ctx| {
            if refs.len() > 2 {
                ValidationResult::fail("too many tags")
            } else {
                ValidationResult::ok()
            }
        });
        let ctx = DecodeContext::new();
        let refs: Vec<_> = (0..3)
            .map(|i| ResourceIdentifier::new("tags", i.to_string()))
            .collect();
        assert!(!spec.validate(&refs, &ctx).is_valid());
        assert!(spec.validate(&refs[..2], &ctx).is_valid());
    }
}
