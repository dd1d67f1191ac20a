//! # Attribute Field Descriptors
//!
//! An [`AttributeSpec`] describes one scalar/structured field of a
//! resource: its document key, access mode, required flag, the
//! validate-if-empty flag, an optional raw-value filter, an optional
//! validator, and the erased setter that applies the value onto the
//! mapped instance.

use serde_json::Value;

use resin_core::{Access, DecodeContext, Instance, ValidationResult};

/// Validator signature for attributes. Receives the staged value (`None`
/// for a nil/absent value) and the full decode context for
/// interdependent-field checks.
pub type AttributeValidator = dyn Fn(Option<&Value>, &DecodeContext) -> ValidationResult;

/// Filter signature: raw document value in, normalized value out.
pub type ValueFilter = dyn Fn(Value) -> Value;

type Apply = dyn Fn(&Instance, Option<&Value>);

/// Descriptor for one attribute field of a resource schema.
pub struct AttributeSpec {
    key: String,
    access: Access,
    required: bool,
    validate_if_empty: bool,
    filter: Option<Box<ValueFilter>>,
    validator: Option<Box<AttributeValidator>>,
    apply: Box<Apply>,
}

impl AttributeSpec {
    /// Create a spec for `key` with a typed setter. The mapped type is
    /// inferred from the closure; the spec defaults to read-write access,
    /// not required, and no validate-if-empty.
    ///
    /// The setter receives `None` when a nil value is applied (clearing
    /// the field on the mapped instance).
    pub fn new<T, F>(key: impl Into<String>, apply: F) -> Self
    where
        T: 'static,
        F: Fn(&mut T, Option<&Value>) + 'static,
    {
        let key = key.into();
        let apply_key = key.clone();
        Self {
            key,
            access: Access::default(),
            required: false,
            validate_if_empty: false,
            filter: None,
            validator: None,
            apply: Box::new(move |instance, value| match instance.borrow_mut::<T>() {
                Some(mut mapped) => apply(&mut mapped, value),
                None => tracing::warn!(
                    key = %apply_key,
                    "attribute setter skipped: instance does not hold the schema's mapped type"
                ),
            }),
        }
    }

    /// Mark this attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the access mode (read-write by default).
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Run the validator even when the staged value is nil. Without this
    /// flag a nil value bypasses the validator and is applied directly.
    pub fn validate_if_empty(mut self) -> Self {
        self.validate_if_empty = true;
        self
    }

    /// Install a raw-value filter, run during staging before anything
    /// else sees the value.
    pub fn with_filter(mut self, filter: impl Fn(Value) -> Value + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Install a validator.
    pub fn with_validator(
        mut self,
        validator: impl Fn(Option<&Value>, &DecodeContext) -> ValidationResult + 'static,
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

    /// Whether the field must be present (create) / non-nil.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a nil staged value still goes through the validator.
    pub fn validates_if_empty(&self) -> bool {
        self.validate_if_empty
    }

    /// Run the filter over a raw value; identity when none is installed.
    pub fn filter_value(&self, raw: Value) -> Value {
        match &self.filter {
            Some(filter) => filter(raw),
            None => raw,
        }
    }

    /// Run the validator; a spec without one accepts everything.
    pub fn validate(&self, value: Option<&Value>, ctx: &DecodeContext) -> ValidationResult {
        match &self.validator {
            Some(validator) => validator(value, ctx),
            None => ValidationResult::ok(),
        }
    }

    /// Apply a value onto the mapped instance through the erased setter.
    pub fn apply(&self, instance: &Instance, value: Option<&Value>) {
        (self.apply)(instance, value);
    }
}

impl std::fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("key", &self.key)
            .field("access", &self.access)
            .field("required", &self.required)
            .field("validate_if_empty", &self.validate_if_empty)
            .finish_non_exhaustive()
    }
}
