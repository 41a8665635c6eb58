//! Semantic matcher wire format tests.

use formwright::extract::ControlDescriptor;
use formwright::fields::FieldSet;
use formwright::matchers::semantic::{build_request, parse_mapping};
use formwright::matchers::MatchError;
use formwright::page::ControlKind;

fn controls() -> Vec<ControlDescriptor> {
    vec![ControlDescriptor {
        kind: ControlKind::Text,
        name: "email".to_owned(),
        id: "user-email".to_owned(),
        placeholder: String::new(),
        label: "Email address".to_owned(),
        options: None,
    }]
}

fn fields() -> FieldSet {
    [("email", "a@example.com")].into_iter().collect()
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "model": "gpt-3.5-turbo"
    })
    .to_string()
}

#[test]
fn build_request_sets_model_temperature_and_format() {
    let request = build_request("gpt-3.5-turbo", &controls(), &fields()).expect("builds");
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert!((request.temperature - 0.1).abs() < f32::EPSILON);
    assert_eq!(request.response_format.kind, "json_object");
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[0].content.contains("form-filling assistant"));
    assert_eq!(request.messages[1].role, "user");
}

#[test]
fn build_request_user_payload_carries_elements_and_data() {
    let request = build_request("gpt-3.5-turbo", &controls(), &fields()).expect("builds");
    let payload: serde_json::Value =
        serde_json::from_str(&request.messages[1].content).expect("user content is JSON");

    assert_eq!(payload["formElements"][0]["id"], "user-email");
    assert_eq!(payload["formElements"][0]["type"], "text");
    assert_eq!(payload["formElements"][0]["label"], "Email address");
    assert_eq!(payload["formData"]["email"], "a@example.com");
}

#[test]
fn parse_mapping_reads_nested_field_mappings() {
    let body = completion_body(r#"{"fieldMappings": {"user-email": "email"}}"#);
    let mapping = parse_mapping(&body)
        .expect("parses")
        .expect("mapping present");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get("user-email"), Some("email"));
}

#[test]
fn parse_mapping_without_field_mappings_is_absent() {
    let body = completion_body(r#"{"something": "else"}"#);
    assert!(parse_mapping(&body).expect("parses").is_none());
}

#[test]
fn parse_mapping_with_non_object_field_mappings_is_absent() {
    let body = completion_body(r#"{"fieldMappings": ["not", "a", "map"]}"#);
    assert!(parse_mapping(&body).expect("parses").is_none());
}

#[test]
fn parse_mapping_skips_non_string_values() {
    let body = completion_body(r#"{"fieldMappings": {"a": "email", "b": 7}}"#);
    let mapping = parse_mapping(&body)
        .expect("parses")
        .expect("mapping present");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get("a"), Some("email"));
    assert_eq!(mapping.get("b"), None);
}

#[test]
fn parse_mapping_with_unparseable_content_is_a_parse_error() {
    let body = completion_body("not json at all");
    assert!(matches!(parse_mapping(&body), Err(MatchError::Parse(_))));
}

#[test]
fn parse_mapping_with_invalid_body_is_a_parse_error() {
    assert!(matches!(
        parse_mapping("<html>bad gateway</html>"),
        Err(MatchError::Parse(_))
    ));
}

#[test]
fn parse_mapping_with_no_choices_is_absent() {
    let body = r#"{"choices": [], "model": "gpt-3.5-turbo"}"#;
    assert!(parse_mapping(body).expect("parses").is_none());
}

#[test]
fn parse_mapping_with_null_content_is_absent() {
    let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
    assert!(parse_mapping(body).expect("parses").is_none());
}
