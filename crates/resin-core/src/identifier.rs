//! # Resource Identifiers & Field Access Modes
//!
//! [`ResourceIdentifier`] is the `{type, id}` pair that addresses one
//! resource on the wire. [`Access`] is the per-field read/write mode that
//! decides whether a field participates in decoding at all.

use serde::{Deserialize, Serialize};

/// Addresses one resource: a resource-type string plus an identifier.
///
/// Serde renames map the Rust field names onto the wire members `type`
/// and `id`. Two identifiers are the same resource exactly when both
/// members are equal, so the type is `Eq + Hash` and can key caches and
/// appear in staged relationship lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// Resource-type string (e.g. `"articles"`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource identifier, always a string on the wire.
    pub id: String,
}

impl ResourceIdentifier {
    /// Create an identifier from a type string and an id.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Per-field access mode.
///
/// Decoding only ever touches fields whose mode includes write; a
/// read-only field present in an incoming document is ignored, not an
/// error. (Read access matters to the encode direction, which is out of
/// scope here, but the mode is part of the schema contract either way.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Field is only read out of mapped instances (encode direction).
    Read,
    /// Field is only written onto mapped instances (decode direction).
    Write,
    /// Field participates in both directions.
    ReadWrite,
}

impl Access {
    /// Whether the decode pipeline may write this field.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    /// Whether the encode direction may read this field.
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }
}

impl Default for Access {
    fn default() -> Self {
        Self::ReadWrite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_wire_field_names() {
        let ident = ResourceIdentifier::new("users", "1");
        let val = serde_json::to_value(&ident).unwrap();
        assert_eq!(val["type"], "users");
        assert_eq!(val["id"], "1");
        assert!(val.get("resource_type").is_none());
    }

    #[test]
    fn identifier_deserializes_from_wire_pair() {
        let ident: ResourceIdentifier =
            serde_json::from_str(r#"{"type":"articles","id":"42"}"#).unwrap();
        assert_eq!(ident.resource_type, "articles");
        assert_eq!(ident.id, "42");
    }

    #[test]
    fn identifier_equality_and_hash() {
        use std::collections::HashSet;
        let a = ResourceIdentifier::new("users", "1");
        let b = ResourceIdentifier::new("users", "1");
        let c = ResourceIdentifier::new("users", "2");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn identifier_display() {
        let ident = ResourceIdentifier::new("articles", "7");
        assert_eq!(ident.to_string(), "articles:7");
    }

    #[test]
    fn access_writability() {
        assert!(Access::Write.is_writable());
        assert!(Access::ReadWrite.is_writable());
        assert!(!Access::Read.is_writable());
    }

    #[test]
    fn access_readability() {
        assert!(Access::Read.is_readable());
        assert!(Access::ReadWrite.is_readable());
        assert!(!Access::Write.is_readable());
    }

    #[test]
    fn access_default_is_read_write() {
        assert_eq!(Access::default(), Access::ReadWrite);
    }
}
