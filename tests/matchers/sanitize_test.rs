//! Error-body sanitization tests.

use formwright::matchers::sanitize_http_error_body;

#[test]
fn redacts_secret_shaped_tokens() {
    let body = r#"{"error": "invalid key sk-abcdefghijklmnopqrstuvwx provided"}"#;
    let sanitized = sanitize_http_error_body(body);
    assert!(!sanitized.contains("sk-abcdefghijklmnopqrstuvwx"));
    assert!(sanitized.contains("[REDACTED]"));
}

#[test]
fn collapses_whitespace() {
    let sanitized = sanitize_http_error_body("an  error\n\n   occurred\there");
    assert_eq!(sanitized, "an error occurred here");
}

#[test]
fn truncates_long_bodies() {
    let body = "x".repeat(1000);
    let sanitized = sanitize_http_error_body(&body);
    assert!(sanitized.ends_with("...[truncated]"));
    assert!(sanitized.chars().count() < 300);
}

#[test]
fn short_clean_bodies_pass_through() {
    assert_eq!(sanitize_http_error_body("rate limited"), "rate limited");
}
