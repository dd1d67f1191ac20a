//! # Per-Call Decode Context
//!
//! [`DecodeContext`] is the staging area for one decode operation. Pass 1
//! of hydration stages every writable field's filtered value here; pass 2
//! validates and applies from the staged state, never from the raw
//! document. Validators receive the context by reference, which is what
//! makes interdependent checks ("`end` must be after `start`") possible:
//! by the time any validator runs, every sibling field is already staged.
//!
//! The context is ephemeral: reset at the start of every decode call and
//! never shared across calls.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::identifier::ResourceIdentifier;

/// A relationship reference staged during pass 1.
///
/// Tagged by cardinality so pass 2 dispatches with a `match`, never a
/// runtime type test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedRelationship {
    /// To-one: `None` when the document said `data: null` or the field
    /// was absent (the `modified` set tells the two apart).
    One(Option<ResourceIdentifier>),
    /// To-many: the full ordered reference list; empty when the document
    /// sent an empty array or the field was absent.
    Many(Vec<ResourceIdentifier>),
}

/// Mutable state for a single decode operation.
#[derive(Debug, Default)]
pub struct DecodeContext {
    attributes: BTreeMap<String, Option<Value>>,
    relationships: BTreeMap<String, StagedRelationship>,
    modified: BTreeSet<String>,
    id: Option<String>,
}

impl DecodeContext {
    /// A fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all staged state. Called at the start of every decode.
    pub fn reset(&mut self) {
        self.attributes.clear();
        self.relationships.clear();
        self.modified.clear();
        self.id = None;
    }

    /// The identifier of the resource being decoded, when known (update
    /// documents, or create documents with an accepted client id).
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Record the identifier of the resource being decoded.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Stage an attribute value under its key. `None` stages "no value".
    pub fn stage_attribute(&mut self, key: impl Into<String>, value: Option<Value>) {
        self.attributes.insert(key.into(), value);
    }

    /// Stage a relationship reference under its key.
    pub fn stage_relationship(&mut self, key: impl Into<String>, staged: StagedRelationship) {
        self.relationships.insert(key.into(), staged);
    }

    /// Mark a key as actually present in the incoming document.
    pub fn mark_modified(&mut self, key: impl Into<String>) {
        self.modified.insert(key.into());
    }

    /// Whether the incoming document touched this key.
    pub fn is_modified(&self, key: &str) -> bool {
        self.modified.contains(key)
    }

    /// The staged value for an attribute key, flattened: `None` both for
    /// a never-staged key and for a staged-nil value. Validators use this
    /// to inspect sibling fields.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).and_then(Option::as_ref)
    }

    /// The staged reference(s) for a relationship key.
    pub fn relationship(&self, key: &str) -> Option<&StagedRelationship> {
        self.relationships.get(key)
    }
}
