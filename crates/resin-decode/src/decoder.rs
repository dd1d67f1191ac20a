//! # Decoder
//!
//! Orchestrates a decode operation end to end: shape gate, schema match,
//! two-pass hydration, identity-cached relationship resolution, and
//! field-error accumulation.
//!
//! ## Reentrancy contract
//!
//! A `Decoder` performs one decode call at a time. All mutable state —
//! the staging context, the error list, the identity cache — is reset at
//! the start of every call and belongs to that call alone. The type is
//! not `Send`; callers that need concurrency use one `Decoder` per
//! operation.

use serde_json::{Map, Value};

use resin_core::{DecodeContext, Instance, ResourceIdentifier, StagedRelationship, ValidationResult};
use resin_schema::{
    AttributeSpec, RelationshipSpec, ResourceSchema, SchemaRegistry, ToManySpec, ToOneSpec,
};

use crate::cache::ObjectIdentityCache;
use crate::document::{
    parse_to_many_payload, parse_to_one_payload, DefaultShapeValidator, DocumentKind,
    ShapeValidator,
};
use crate::error::{DecodeError, ErrorDocument, ErrorSource, FieldError};

/// Detail message for a required field that is missing or nil.
const DETAIL_REQUIRED: &str = "Field is required.";

/// Detail message when no item of a non-empty to-many list resolved.
const DETAIL_UNEXPECTED_TYPE: &str = "Unexpected resource type.";

/// Fallback detail when a validator fails without messages.
const DETAIL_INVALID: &str = "Invalid value.";

/// Decodes serialized resource documents into hydrated object graphs.
pub struct Decoder {
    shape: Box<dyn ShapeValidator>,
    context: DecodeContext,
    errors: Vec<FieldError>,
    cache: ObjectIdentityCache,
}

impl Decoder {
    /// A decoder using the built-in structural shape rules.
    pub fn new() -> Self {
        Self::with_shape_validator(DefaultShapeValidator)
    }

    /// A decoder using a custom document-shape validator.
    pub fn with_shape_validator(shape: impl ShapeValidator + 'static) -> Self {
        Self {
            shape: Box::new(shape),
            context: DecodeContext::new(),
            errors: Vec::new(),
            cache: ObjectIdentityCache::new(),
        }
    }

    // -----------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------

    /// Decode a create document into a freshly hydrated instance.
    ///
    /// Missing writable fields are violations (full hydration). A
    /// `data.id` member is only accepted when `allow_client_id` is set;
    /// otherwise it is a fatal [`DecodeError::InvalidFormat`].
    ///
    /// `Ok(None)` means field validation failed; the accumulated report
    /// is available through [`error_document`](Self::error_document).
    pub fn decode_create(
        &mut self,
        input: &str,
        schemas: &SchemaRegistry,
        allow_client_id: bool,
    ) -> Result<Option<Instance>, DecodeError> {
        self.begin();
        tracing::debug!(kind = %DocumentKind::Create, allow_client_id, "decoding document");

        let document = parse_json(input)?;
        self.check_shape(DocumentKind::Create, &document)?;
        let data = document_data(&document)?;

        let resource_type = member_str(data, "type")?;
        let schema = schemas.resolve_type(resource_type)?;

        let client_id = data.get("id").and_then(Value::as_str);
        if let Some(id) = client_id {
            if !allow_client_id {
                return Err(DecodeError::InvalidFormat(
                    "client-generated id is not allowed for this operation".to_owned(),
                ));
            }
            self.context.set_id(id);
        }

        let instance = match client_id {
            Some(id) => self.cache.resolve(schema, id),
            None => schema.create(),
        };

        self.hydrate(schema, &instance, data, schemas, false)?;
        Ok(self.finish(instance))
    }

    /// Decode an update document onto an instance with a known id.
    ///
    /// `data.id` is mandatory; a supplied `expected_id` that differs is a
    /// fatal [`DecodeError::IdentifierMismatch`]. Missing fields are left
    /// untouched (partial update) unless `deny_missing_fields` is set.
    pub fn decode_update(
        &mut self,
        input: &str,
        schemas: &SchemaRegistry,
        expected_id: Option<&str>,
        deny_missing_fields: bool,
    ) -> Result<Option<Instance>, DecodeError> {
        self.begin();
        tracing::debug!(kind = %DocumentKind::Update, deny_missing_fields, "decoding document");

        let document = parse_json(input)?;
        self.check_shape(DocumentKind::Update, &document)?;
        let data = document_data(&document)?;

        let id = member_str(data, "id")?;
        if let Some(expected) = expected_id {
            if expected != id {
                return Err(DecodeError::IdentifierMismatch {
                    expected: expected.to_owned(),
                    actual: id.to_owned(),
                });
            }
        }

        let resource_type = member_str(data, "type")?;
        let schema = schemas.resolve_type(resource_type)?;

        self.context.set_id(id);
        let instance = self.cache.resolve(schema, id);

        self.hydrate(schema, &instance, data, schemas, !deny_missing_fields)?;
        Ok(self.finish(instance))
    }

    /// Decode a to-one relationship document into an identity-only
    /// instance, or `Ok(None)` for `data: null` (with no errors — this
    /// is the legitimately-null case the caller disambiguates through
    /// [`has_validation_errors`](Self::has_validation_errors)).
    pub fn decode_to_one_relationship(
        &mut self,
        input: &str,
        schemas: &SchemaRegistry,
    ) -> Result<Option<Instance>, DecodeError> {
        self.begin();
        tracing::debug!(kind = %DocumentKind::ToOneRelationship, "decoding document");

        let document = parse_json(input)?;
        self.check_shape(DocumentKind::ToOneRelationship, &document)?;

        match parse_to_one_payload(&document)? {
            None => Ok(None),
            Some(reference) => {
                let schema = schemas.resolve_type(&reference.resource_type)?;
                Ok(Some(self.cache.resolve(schema, &reference.id)))
            }
        }
    }

    /// Decode a to-many relationship document into a list of
    /// identity-only instances. Duplicate `(type, id)` entries alias the
    /// same instance.
    pub fn decode_to_many_relationship(
        &mut self,
        input: &str,
        schemas: &SchemaRegistry,
    ) -> Result<Option<Vec<Instance>>, DecodeError> {
        self.begin();
        tracing::debug!(kind = %DocumentKind::ToManyRelationship, "decoding document");

        let document = parse_json(input)?;
        self.check_shape(DocumentKind::ToManyRelationship, &document)?;

        let references = parse_to_many_payload(&document)?;
        let mut resolved = Vec::with_capacity(references.len());
        for reference in &references {
            let schema = schemas.resolve_type(&reference.resource_type)?;
            resolved.push(self.cache.resolve(schema, &reference.id));
        }
        Ok(Some(resolved))
    }

    // -----------------------------------------------------------------
    // Error reporting
    // -----------------------------------------------------------------

    /// Record a field error over an attribute key.
    pub fn add_attribute_error(&mut self, key: impl Into<String>, detail: impl Into<String>) {
        self.errors.push(FieldError {
            source: ErrorSource::Attribute(key.into()),
            detail: detail.into(),
        });
    }

    /// Record a field error over a relationship key.
    pub fn add_relationship_error(&mut self, key: impl Into<String>, detail: impl Into<String>) {
        self.errors.push(FieldError {
            source: ErrorSource::Relationship(key.into()),
            detail: detail.into(),
        });
    }

    /// Whether the last decode call accumulated field errors.
    pub fn has_validation_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The accumulated field errors of the last decode call.
    pub fn validation_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Build the wire-form error document for the last decode call, or
    /// `None` when it was clean.
    pub fn error_document(&self) -> Option<ErrorDocument> {
        ErrorDocument::from_field_errors(&self.errors)
    }

    // -----------------------------------------------------------------
    // Per-call lifecycle
    // -----------------------------------------------------------------

    fn begin(&mut self) {
        self.context.reset();
        self.errors.clear();
        self.cache.reset();
    }

    fn finish(&self, instance: Instance) -> Option<Instance> {
        if self.errors.is_empty() {
            Some(instance)
        } else {
            tracing::debug!(errors = self.errors.len(), "decode failed field validation");
            None
        }
    }

    fn check_shape(&self, kind: DocumentKind, document: &Value) -> Result<(), DecodeError> {
        if self.shape.conforms(kind, document) {
            Ok(())
        } else {
            Err(DecodeError::InvalidFormat(format!(
                "document does not conform to the {kind} shape"
            )))
        }
    }

    // -----------------------------------------------------------------
    // Two-pass hydration
    // -----------------------------------------------------------------

    fn hydrate(
        &mut self,
        schema: &ResourceSchema,
        instance: &Instance,
        data: &Value,
        schemas: &SchemaRegistry,
        ignore_missing: bool,
    ) -> Result<(), DecodeError> {
        let attributes = data.get("attributes").and_then(Value::as_object);
        let relationships = data.get("relationships").and_then(Value::as_object);
        self.stage_fields(schema, attributes, relationships)?;
        self.apply_fields(schema, instance, schemas, ignore_missing);
        Ok(())
    }

    /// Pass 1: stage every writable field so that validators in pass 2
    /// can see all siblings before any single field is judged.
    fn stage_fields(
        &mut self,
        schema: &ResourceSchema,
        attributes: Option<&Map<String, Value>>,
        relationships: Option<&Map<String, Value>>,
    ) -> Result<(), DecodeError> {
        for spec in schema.attributes() {
            if !spec.access().is_writable() {
                continue;
            }
            let key = spec.key();
            match attributes.and_then(|map| map.get(key)) {
                Some(raw) => {
                    let filtered = spec.filter_value(raw.clone());
                    // A JSON null stages as nil-but-modified; the
                    // `modified` set keeps it apart from an absent key.
                    let staged = (!filtered.is_null()).then_some(filtered);
                    self.context.stage_attribute(key, staged);
                    self.context.mark_modified(key);
                    tracing::trace!(key, "attribute staged");
                }
                None => self.context.stage_attribute(key, None),
            }
        }

        for spec in schema.relationships() {
            if !spec.access().is_writable() {
                continue;
            }
            let key = spec.key();
            let payload = relationships.and_then(|map| map.get(key));
            match (spec, payload) {
                (RelationshipSpec::ToOne(_), Some(payload)) => {
                    let reference = parse_to_one_payload(payload)?;
                    self.context
                        .stage_relationship(key, StagedRelationship::One(reference));
                    self.context.mark_modified(key);
                    tracing::trace!(key, "to-one relationship staged");
                }
                (RelationshipSpec::ToOne(_), None) => {
                    self.context
                        .stage_relationship(key, StagedRelationship::One(None));
                }
                (RelationshipSpec::ToMany(_), Some(payload)) => {
                    let references = parse_to_many_payload(payload)?;
                    self.context
                        .stage_relationship(key, StagedRelationship::Many(references));
                    self.context.mark_modified(key);
                    tracing::trace!(key, "to-many relationship staged");
                }
                (RelationshipSpec::ToMany(_), None) => {
                    self.context
                        .stage_relationship(key, StagedRelationship::Many(Vec::new()));
                }
            }
        }
        Ok(())
    }

    /// Pass 2: validate from the staged context and apply onto the
    /// mapped instance. Field failures accumulate; the sweep continues.
    fn apply_fields(
        &mut self,
        schema: &ResourceSchema,
        instance: &Instance,
        schemas: &SchemaRegistry,
        ignore_missing: bool,
    ) {
        for spec in schema.attributes() {
            if !spec.access().is_writable() {
                continue;
            }
            self.apply_attribute(spec, instance, ignore_missing);
        }
        for spec in schema.relationships() {
            if !spec.access().is_writable() {
                continue;
            }
            match spec {
                RelationshipSpec::ToOne(one) => {
                    self.apply_to_one(one, instance, schemas, ignore_missing)
                }
                RelationshipSpec::ToMany(many) => {
                    self.apply_to_many(many, instance, schemas, ignore_missing)
                }
            }
        }
    }

    fn apply_attribute(&mut self, spec: &AttributeSpec, instance: &Instance, ignore_missing: bool) {
        let key = spec.key();
        let staged = self.context.attribute(key).cloned();
        let modified = self.context.is_modified(key);

        match staged {
            None => {
                if ignore_missing && !modified {
                    tracing::trace!(key, "attribute untouched; skipped in partial mode");
                    return;
                }
                if spec.is_required() {
                    self.add_attribute_error(key, DETAIL_REQUIRED);
                    return;
                }
                if !spec.validates_if_empty() {
                    // Policy: a nil value on a non-validate-if-empty
                    // field bypasses the validator and applies once.
                    spec.apply(instance, None);
                    return;
                }
                let result = spec.validate(None, &self.context);
                if result.is_valid() {
                    spec.apply(instance, None);
                } else {
                    self.record_failure(ErrorSource::Attribute(key.to_owned()), result);
                }
            }
            Some(value) => {
                let result = spec.validate(Some(&value), &self.context);
                if result.is_valid() {
                    spec.apply(instance, Some(&value));
                } else {
                    self.record_failure(ErrorSource::Attribute(key.to_owned()), result);
                }
            }
        }
    }

    fn apply_to_one(
        &mut self,
        spec: &ToOneSpec,
        instance: &Instance,
        schemas: &SchemaRegistry,
        ignore_missing: bool,
    ) {
        let key = spec.key();
        let staged = match self.context.relationship(key) {
            Some(StagedRelationship::One(reference)) => reference.clone(),
            _ => None,
        };
        let modified = self.context.is_modified(key);

        match staged {
            None => {
                if ignore_missing && !modified {
                    tracing::trace!(key, "to-one untouched; skipped in partial mode");
                    return;
                }
                if spec.is_required() {
                    self.add_relationship_error(key, DETAIL_REQUIRED);
                    return;
                }
                if !spec.validates_if_empty() {
                    spec.assign(instance, None);
                    return;
                }
                let result = spec.validate(None, &self.context);
                if result.is_valid() {
                    spec.assign(instance, None);
                } else {
                    self.record_failure(ErrorSource::Relationship(key.to_owned()), result);
                }
            }
            Some(reference) => {
                let result = spec.validate(Some(&reference), &self.context);
                if !result.is_valid() {
                    self.record_failure(ErrorSource::Relationship(key.to_owned()), result);
                    return;
                }
                match self.expected_target(spec.expects_type(&reference.resource_type), schemas, &reference)
                {
                    Some(resolved) => spec.assign(instance, Some(resolved)),
                    None => self.add_relationship_error(
                        key,
                        format!(
                            "Cannot resolve resource type '{}'",
                            reference.resource_type
                        ),
                    ),
                }
            }
        }
    }

    fn apply_to_many(
        &mut self,
        spec: &ToManySpec,
        instance: &Instance,
        schemas: &SchemaRegistry,
        ignore_missing: bool,
    ) {
        let key = spec.key();
        let staged = match self.context.relationship(key) {
            Some(StagedRelationship::Many(references)) => references.clone(),
            _ => Vec::new(),
        };
        let modified = self.context.is_modified(key);

        if !modified {
            if ignore_missing {
                tracing::trace!(key, "to-many untouched; skipped in partial mode");
                return;
            }
            if spec.is_required() {
                self.add_relationship_error(key, DETAIL_REQUIRED);
                return;
            }
            if spec.validates_if_empty() {
                let result = spec.validate(&staged, &self.context);
                if !result.is_valid() {
                    self.record_failure(ErrorSource::Relationship(key.to_owned()), result);
                    return;
                }
            }
            spec.clear(instance);
            return;
        }

        let result = spec.validate(&staged, &self.context);
        if !result.is_valid() {
            self.record_failure(ErrorSource::Relationship(key.to_owned()), result);
            return;
        }

        // Full replacement: clear, then add every item whose type matches
        // an expected schema. An empty staged list just clears.
        spec.clear(instance);
        if staged.is_empty() {
            return;
        }

        let mut added = 0usize;
        for reference in &staged {
            match self.expected_target(spec.expects_type(&reference.resource_type), schemas, reference)
            {
                Some(resolved) => {
                    spec.push(instance, resolved);
                    added += 1;
                }
                None => tracing::trace!(
                    key,
                    resource_type = %reference.resource_type,
                    "to-many item skipped: unexpected resource type"
                ),
            }
        }
        if added == 0 {
            self.add_relationship_error(key, DETAIL_UNEXPECTED_TYPE);
        }
    }

    /// Resolve a relationship target through the identity cache, but
    /// only when the referenced type is expected by the spec and carried
    /// by an admissible schema.
    fn expected_target(
        &mut self,
        type_expected: bool,
        schemas: &SchemaRegistry,
        reference: &ResourceIdentifier,
    ) -> Option<Instance> {
        if !type_expected {
            return None;
        }
        let schema = schemas.get(&reference.resource_type)?;
        Some(self.cache.resolve(schema, &reference.id))
    }

    fn record_failure(&mut self, source: ErrorSource, result: ValidationResult) {
        if result.messages().is_empty() {
            self.errors.push(FieldError {
                source,
                detail: DETAIL_INVALID.to_owned(),
            });
            return;
        }
        for message in result.messages() {
            self.errors.push(FieldError {
                source: source.clone(),
                detail: message.clone(),
            });
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("errors", &self.errors)
            .field("cached_instances", &self.cache.len())
            .finish_non_exhaustive()
    }
}

fn parse_json(input: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(input)
        .map_err(|err| DecodeError::InvalidFormat(format!("malformed JSON: {err}")))
}

fn document_data(document: &Value) -> Result<&Value, DecodeError> {
    document
        .get("data")
        .ok_or_else(|| DecodeError::InvalidFormat("document has no 'data' member".to_owned()))
}

fn member_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, DecodeError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::InvalidFormat(format!("member '{key}' must be a string")))
}
