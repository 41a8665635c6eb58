//! Credential file loading and redaction tests.

use std::collections::BTreeMap;
use std::fs;

use formwright::credentials::{load_credentials, resolve_semantic_key, Credentials, SemanticKey};
use tempfile::TempDir;

#[cfg(unix)]
fn write_env_file(dir: &TempDir, contents: &str, mode: u32) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(".env");
    fs::write(&path, contents).expect("write env file");
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("set permissions");
    path
}

#[cfg(unix)]
#[test]
fn loads_private_env_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_env_file(&dir, "OPENAI_API_KEY=sk-test-key\nOTHER=1\n", 0o600);

    let creds = load_credentials(&path).expect("loads");
    assert_eq!(creds.get("OPENAI_API_KEY"), Some("sk-test-key"));
    assert_eq!(creds.get("OTHER"), Some("1"));
    assert_eq!(creds.get("MISSING"), None);
}

#[cfg(unix)]
#[test]
fn rejects_world_readable_env_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_env_file(&dir, "OPENAI_API_KEY=sk-test-key\n", 0o644);

    let error = load_credentials(&path).expect_err("must reject");
    assert!(error.to_string().contains("0600"), "error: {error}");
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_credentials(std::path::Path::new("/nonexistent/.env")).is_err());
}

#[test]
fn debug_output_redacts_values() {
    let mut vars = BTreeMap::new();
    vars.insert("OPENAI_API_KEY".to_owned(), "sk-secret-value".to_owned());
    let creds = Credentials::from_map(vars);

    let debug = format!("{creds:?}");
    assert!(!debug.contains("sk-secret-value"));
    assert!(debug.contains("[REDACTED]"));

    let key = SemanticKey::new("sk-secret-value");
    let debug = format!("{key:?}");
    assert!(!debug.contains("sk-secret-value"));
}

#[test]
fn key_resolves_from_loaded_credentials() {
    let mut vars = BTreeMap::new();
    vars.insert("OPENAI_API_KEY".to_owned(), "sk-from-file".to_owned());
    let creds = Credentials::from_map(vars);

    // The process environment may also carry a key and takes precedence;
    // either way a key must resolve here.
    assert!(resolve_semantic_key(&creds).is_some());
}

#[test]
fn blank_credential_value_does_not_resolve_from_file() {
    let mut vars = BTreeMap::new();
    vars.insert("OPENAI_API_KEY".to_owned(), "   ".to_owned());
    let creds = Credentials::from_map(vars);

    if std::env::var("OPENAI_API_KEY").is_err() {
        assert!(resolve_semantic_key(&creds).is_none());
    }
}
