//! # Document Shapes
//!
//! The structural contracts of the four accepted document kinds, checked
//! once per call before any domain processing. The check itself sits
//! behind the [`ShapeValidator`] trait so hosts can substitute their own
//! ruleset; [`DefaultShapeValidator`] implements the fixed structural
//! rules.
//!
//! This module also owns the relationship-payload parsers that turn
//! `{"data": null | {type,id} | [{type,id}, ...]}` trees into
//! [`ResourceIdentifier`]s — shared between relationship documents and
//! the relationship members of resource documents.

use serde_json::Value;

use resin_core::ResourceIdentifier;

use crate::error::DecodeError;

/// The four document kinds the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Resource creation: `data` object with `type`, optional `id`,
    /// optional `attributes`/`relationships`.
    Create,
    /// Resource update: like [`Create`](Self::Create) but `id` is
    /// mandatory.
    Update,
    /// To-one relationship document: `data` is null or one identifier.
    ToOneRelationship,
    /// To-many relationship document: `data` is an identifier array.
    ToManyRelationship,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::ToOneRelationship => "to-one relationship",
            Self::ToManyRelationship => "to-many relationship",
        };
        f.write_str(name)
    }
}

/// Structural gate run over the parsed tree before domain processing.
pub trait ShapeValidator {
    /// Whether `document` conforms to the structural shape of `kind`.
    fn conforms(&self, kind: DocumentKind, document: &Value) -> bool;
}

/// The fixed structural ruleset for the four document kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultShapeValidator;

impl ShapeValidator for DefaultShapeValidator {
    fn conforms(&self, kind: DocumentKind, document: &Value) -> bool {
        match kind {
            DocumentKind::Create => resource_document_conforms(document, false),
            DocumentKind::Update => resource_document_conforms(document, true),
            DocumentKind::ToOneRelationship => match document.get("data") {
                Some(Value::Null) => true,
                Some(data) => is_identifier_object(data),
                None => false,
            },
            DocumentKind::ToManyRelationship => match document.get("data") {
                Some(Value::Array(items)) => items.iter().all(is_identifier_object),
                _ => false,
            },
        }
    }
}

/// Shape rules shared by create and update documents.
fn resource_document_conforms(document: &Value, id_mandatory: bool) -> bool {
    let Some(data) = document.get("data") else {
        return false;
    };
    if !data.is_object() {
        return false;
    }
    if !data.get("type").is_some_and(Value::is_string) {
        return false;
    }
    match data.get("id") {
        Some(id) => {
            if !id.is_string() {
                return false;
            }
        }
        None => {
            if id_mandatory {
                return false;
            }
        }
    }
    if let Some(attributes) = data.get("attributes") {
        if !attributes.is_object() {
            return false;
        }
    }
    match data.get("relationships") {
        Some(Value::Object(members)) => members.values().all(Value::is_object),
        Some(_) => false,
        None => true,
    }
}

/// Whether `value` is a `{type, id}` identifier object.
fn is_identifier_object(value: &Value) -> bool {
    value.is_object()
        && value.get("type").is_some_and(Value::is_string)
        && value.get("id").is_some_and(Value::is_string)
}

/// Parse an identifier object, which the shape gate may not have seen
/// (relationship members of resource documents are parsed lazily).
fn parse_identifier(value: &Value) -> Result<ResourceIdentifier, DecodeError> {
    if !is_identifier_object(value) {
        return Err(DecodeError::InvalidFormat(
            "relationship data must be a {type, id} identifier object".to_owned(),
        ));
    }
    // is_identifier_object guarantees both members are strings.
    Ok(ResourceIdentifier::new(
        value["type"].as_str().unwrap_or_default(),
        value["id"].as_str().unwrap_or_default(),
    ))
}

/// Parse a to-one relationship payload `{"data": null | {type,id}}` into
/// an optional reference. Malformed payloads are fatal.
pub(crate) fn parse_to_one_payload(
    payload: &Value,
) -> Result<Option<ResourceIdentifier>, DecodeError> {
    match payload.get("data") {
        Some(Value::Null) => Ok(None),
        Some(data) => parse_identifier(data).map(Some),
        None => Err(DecodeError::InvalidFormat(
            "to-one relationship payload must contain a 'data' member".to_owned(),
        )),
    }
}

/// Parse a to-many relationship payload `{"data": [{type,id}, ...]}`
/// into a reference list. Malformed payloads are fatal.
pub(crate) fn parse_to_many_payload(
    payload: &Value,
) -> Result<Vec<ResourceIdentifier>, DecodeError> {
    match payload.get("data") {
        Some(Value::Array(items)) => items.iter().map(parse_identifier).collect(),
        Some(_) => Err(DecodeError::InvalidFormat(
            "to-many relationship data must be a list".to_owned(),
        )),
        None => Err(DecodeError::InvalidFormat(
            "to-many relationship payload must contain a 'data' member".to_owned(),
        )),
    }
}
