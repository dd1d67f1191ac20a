//! # Relationship-Document Decoding — Integration Tests
//!
//! The two identity-only entry points: to-one documents resolving to a
//! single instance (or a legitimate null), to-many documents resolving
//! to an instance list with intra-call identity.

use serde_json::json;

use resin_decode::{DecodeError, Decoder};
use resin_schema::{ResourceSchema, SchemaRegistry};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct User {
    id: Option<String>,
}

#[derive(Debug, Default)]
struct Tag {
    id: Option<String>,
}

fn registry() -> SchemaRegistry {
    let user = ResourceSchema::builder::<User>("users")
        .id(|user, id| user.id = Some(id.to_owned()))
        .build();
    let tag = ResourceSchema::builder::<Tag>("tags")
        .id(|tag, id| tag.id = Some(id.to_owned()))
        .build();
    SchemaRegistry::try_from_schemas([user, tag]).unwrap()
}

// ---------------------------------------------------------------------------
// To-one documents
// ---------------------------------------------------------------------------

#[test]
fn to_one_document_resolves_identity_only_instance() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": {"type": "users", "id": "1"}}).to_string();

    let decoded = decoder
        .decode_to_one_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    assert!(!decoder.has_validation_errors());
    assert_eq!(decoded.borrow::<User>().unwrap().id.as_deref(), Some("1"));
}

#[test]
fn to_one_document_null_is_legitimately_none() {
    let mut decoder = Decoder::new();
    let decoded = decoder
        .decode_to_one_relationship(r#"{"data": null}"#, &registry())
        .unwrap();
    // None with a clean error list: the caller-side disambiguation the
    // entry-point contract requires.
    assert!(decoded.is_none());
    assert!(!decoder.has_validation_errors());
    assert!(decoder.error_document().is_none());
}

#[test]
fn to_one_document_unknown_type_is_fatal_not_field_level() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": {"type": "ghosts", "id": "9"}}).to_string();

    let err = decoder
        .decode_to_one_relationship(&doc, &registry())
        .unwrap_err();
    assert_eq!(err, DecodeError::UnresolvedType("ghosts".to_owned()));
    assert!(!decoder.has_validation_errors());
}

#[test]
fn to_one_document_shape_violations_are_fatal() {
    let mut decoder = Decoder::new();
    for doc in [
        r#"{}"#,
        r#"{"data": [{"type": "users", "id": "1"}]}"#,
        r#"{"data": {"type": "users"}}"#,
        r#"{"data": {"id": "1"}}"#,
    ] {
        let err = decoder
            .decode_to_one_relationship(doc, &registry())
            .unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidFormat(_)),
            "expected InvalidFormat for {doc}"
        );
    }
}

// ---------------------------------------------------------------------------
// To-many documents
// ---------------------------------------------------------------------------

#[test]
fn to_many_document_resolves_ordered_list() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": [
        {"type": "users", "id": "1"},
        {"type": "tags", "id": "t1"},
        {"type": "users", "id": "2"}
    ]})
    .to_string();

    let decoded = decoder
        .decode_to_many_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0].borrow::<User>().unwrap().id.as_deref(), Some("1"));
    assert_eq!(decoded[1].borrow::<Tag>().unwrap().id.as_deref(), Some("t1"));
    assert_eq!(decoded[2].borrow::<User>().unwrap().id.as_deref(), Some("2"));
}

#[test]
fn to_many_document_empty_list_is_valid() {
    let mut decoder = Decoder::new();
    let decoded = decoder
        .decode_to_many_relationship(r#"{"data": []}"#, &registry())
        .unwrap()
        .unwrap();
    assert!(decoded.is_empty());
    assert!(!decoder.has_validation_errors());
}

#[test]
fn duplicate_entries_are_reference_identical() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": [
        {"type": "users", "id": "1"},
        {"type": "users", "id": "1"}
    ]})
    .to_string();

    let decoded = decoder
        .decode_to_many_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(decoded[0].ptr_eq(&decoded[1]));
}

#[test]
fn same_id_across_types_stays_distinct() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": [
        {"type": "users", "id": "1"},
        {"type": "tags", "id": "1"}
    ]})
    .to_string();

    let decoded = decoder
        .decode_to_many_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    assert!(!decoded[0].ptr_eq(&decoded[1]));
}

#[test]
fn to_many_document_non_list_data_is_fatal() {
    let mut decoder = Decoder::new();
    let err = decoder
        .decode_to_many_relationship(r#"{"data": {"type": "users", "id": "1"}}"#, &registry())
        .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidFormat(_)));
}

#[test]
fn to_many_document_unknown_entry_type_is_fatal() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": [
        {"type": "users", "id": "1"},
        {"type": "ghosts", "id": "9"}
    ]})
    .to_string();

    let err = decoder
        .decode_to_many_relationship(&doc, &registry())
        .unwrap_err();
    assert_eq!(err, DecodeError::UnresolvedType("ghosts".to_owned()));
}

#[test]
fn identity_does_not_leak_across_calls() {
    let mut decoder = Decoder::new();
    let doc = json!({"data": {"type": "users", "id": "1"}}).to_string();

    let first = decoder
        .decode_to_one_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    let second = decoder
        .decode_to_one_relationship(&doc, &registry())
        .unwrap()
        .unwrap();
    // Same (type, id), but a new call means a new identity scope.
    assert!(!first.ptr_eq(&second));
}
