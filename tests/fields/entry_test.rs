//! Field entry forms and the stored document shape.

use formwright::fields::{FieldEntry, FieldSet, FieldSpec};

#[test]
fn bare_string_entry_deserializes() {
    let entry: FieldEntry = serde_json::from_str("\"Alice\"").expect("bare entry parses");
    assert_eq!(entry, FieldEntry::Bare("Alice".to_owned()));
    assert_eq!(entry.value(), "Alice");
}

#[test]
fn structured_entry_deserializes_with_hints() {
    let json = r#"{"value": "red, blue", "type": "multiselect", "options": ["Red", "Blue"]}"#;
    let entry: FieldEntry = serde_json::from_str(json).expect("structured entry parses");
    let FieldEntry::Structured(spec) = &entry else {
        panic!("expected structured entry");
    };
    assert_eq!(spec.value, "red, blue");
    assert_eq!(spec.kind.as_deref(), Some("multiselect"));
    assert_eq!(
        spec.options,
        Some(vec!["Red".to_owned(), "Blue".to_owned()])
    );
    // The canonical value is the same either way.
    assert_eq!(entry.value(), "red, blue");
}

#[test]
fn structured_entry_value_is_canonical() {
    let mut set = FieldSet::new();
    set.insert(
        "rating",
        FieldSpec {
            value: "4".to_owned(),
            kind: Some("rate".to_owned()),
            ..FieldSpec::default()
        },
    );
    assert_eq!(set.get("rating").map(FieldEntry::value), Some("4"));
}

#[test]
fn bare_object_parses_as_field_set() {
    let set = FieldSet::from_json(r#"{"name": "Alice", "email": "a@example.com"}"#)
        .expect("bare object parses");
    assert_eq!(set.len(), 2);
    assert_eq!(set.get("email").map(FieldEntry::value), Some("a@example.com"));
}

#[test]
fn stored_document_shape_parses_to_inner_fields() {
    let json = r#"{
        "formName": "Signup",
        "source": "resume.pdf",
        "timestamp": 1714000000000,
        "fields": {"name": "Alice", "email": "a@example.com"}
    }"#;
    let set = FieldSet::from_json(json).expect("document parses");
    assert_eq!(set.len(), 2);
    assert_eq!(set.get("name").map(FieldEntry::value), Some("Alice"));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(FieldSet::from_json("[1, 2]").is_err());
    assert!(FieldSet::from_json("{").is_err());
}
