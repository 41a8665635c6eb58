//! Insertion-order guarantees of field sets and mappings.

use formwright::fields::{FieldEntry, FieldMapping, FieldSet};

#[test]
fn field_set_preserves_declaration_order() {
    let json = r#"{"zeta": "1", "alpha": "2", "mid": "3"}"#;
    let set = FieldSet::from_json(json).expect("parses");
    let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn field_set_round_trips_in_order() {
    let json = r#"{"zeta":"1","alpha":"2","mid":"3"}"#;
    let set = FieldSet::from_json(json).expect("parses");
    let out = serde_json::to_string(&set).expect("serializes");
    assert_eq!(out, json);
}

#[test]
fn insert_replaces_in_place() {
    let mut set = FieldSet::new();
    set.insert("first", "1");
    set.insert("second", "2");
    set.insert("first", "updated");

    let entries: Vec<(&str, &str)> = set.iter().map(|(n, e)| (n, e.value())).collect();
    assert_eq!(entries, vec![("first", "updated"), ("second", "2")]);
}

#[test]
fn from_iterator_builds_in_order() {
    let set: FieldSet = [("a", "1"), ("b", "2")].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get("b").map(FieldEntry::value), Some("2"));
}

#[test]
fn mapping_preserves_entry_order() {
    let mut mapping = FieldMapping::new();
    mapping.insert("control-b", "field-1");
    mapping.insert("control-a", "field-2");

    let entries: Vec<(&str, &str)> = mapping.entries().collect();
    assert_eq!(
        entries,
        vec![("control-b", "field-1"), ("control-a", "field-2")]
    );
}

#[test]
fn mapping_insert_overwrites_same_control() {
    let mut mapping = FieldMapping::new();
    mapping.insert("c1", "old");
    mapping.insert("c1", "new");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get("c1"), Some("new"));
}

#[test]
fn mapping_deserializes_from_json_object() {
    let mapping: FieldMapping =
        serde_json::from_str(r#"{"user-email": "email", "user-name": "name"}"#).expect("parses");
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.get("user-email"), Some("email"));
}
