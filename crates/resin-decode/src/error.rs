//! # Decode Errors
//!
//! Two distinct failure channels, deliberately kept apart:
//!
//! - [`DecodeError`] — fatal. Malformed input, shape mismatch,
//!   unresolvable primary type, conflicting update identifier. The call
//!   aborts with no partial result and no error document.
//! - [`FieldError`] / [`ErrorDocument`] — accumulated. Field-level
//!   validation failures collect while the sweep continues, so the
//!   caller gets the complete report in one pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use resin_schema::SchemaError;

/// Fatal decode failures. A call returning one of these produced no
/// object and no error document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Malformed JSON, a structural-shape mismatch, a forbidden client
    /// id, or a malformed relationship payload.
    #[error("invalid document format: {0}")]
    InvalidFormat(String),

    /// The document's resource type matches no admissible schema.
    #[error("cannot resolve resource type '{0}'")]
    UnresolvedType(String),

    /// An update document's id conflicts with the externally supplied
    /// expected id. Raised before hydration begins.
    #[error("document id '{actual}' does not match expected id '{expected}'")]
    IdentifierMismatch {
        /// The id the caller expected.
        expected: String,
        /// The id the document carried.
        actual: String,
    },
}

impl From<SchemaError> for DecodeError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnresolvedType(resource_type) => Self::UnresolvedType(resource_type),
            SchemaError::DuplicateType(_) => Self::InvalidFormat(err.to_string()),
        }
    }
}

/// Where a field error points: an attribute or a relationship, by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    /// Error over `data.attributes.<key>`.
    Attribute(String),
    /// Error over `data.relationships.<key>`.
    Relationship(String),
}

impl ErrorSource {
    /// The field key, independent of kind.
    pub fn key(&self) -> &str {
        match self {
            Self::Attribute(key) | Self::Relationship(key) => key,
        }
    }

    /// The JSON pointer for the wire-level error object.
    pub fn pointer(&self) -> String {
        match self {
            Self::Attribute(key) => format!("/data/attributes/{key}"),
            Self::Relationship(key) => format!("/data/relationships/{key}"),
        }
    }
}

/// One accumulated field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Which field failed.
    pub source: ErrorSource,
    /// Human-readable detail.
    pub detail: String,
}

/// One error object in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// HTTP-flavored status, `"422"` for validation failures.
    pub status: String,
    /// Pointer to the failing field.
    pub source: ErrorPointer,
    /// Human-readable detail.
    pub detail: String,
}

/// The `source` member of a wire error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPointer {
    /// JSON pointer such as `/data/attributes/title`.
    pub pointer: String,
}

/// Ordered collection of wire error objects, built only when at least
/// one field error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    /// Status string stamped on every error object.
    pub const VALIDATION_STATUS: &'static str = "422";

    /// Build from accumulated field errors; `None` when the list is
    /// empty (a clean decode has no error document).
    pub fn from_field_errors(field_errors: &[FieldError]) -> Option<Self> {
        if field_errors.is_empty() {
            return None;
        }
        Some(Self {
            errors: field_errors
                .iter()
                .map(|err| ErrorObject {
                    status: Self::VALIDATION_STATUS.to_owned(),
                    source: ErrorPointer {
                        pointer: err.source.pointer(),
                    },
                    detail: err.detail.clone(),
                })
                .collect(),
        })
    }

    /// The error objects, in accumulation order.
    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    /// The numeric status code shared by all validation errors.
    pub fn status(&self) -> u16 {
        422
    }
}
