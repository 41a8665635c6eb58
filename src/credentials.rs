//! Credential loading from the runtime `.env` file.
//!
//! The semantic matcher needs an API key; its absence is a normal,
//! expected state that routes every fill through the rule matcher, never
//! an error. Debug output never prints credential values.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Environment key the semantic API key is read from.
const SEMANTIC_KEY_VAR: &str = "OPENAI_API_KEY";

/// Runtime credentials loaded from the `.env` file.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether no credentials are loaded.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Load credentials from a specific `.env` path.
///
/// # Errors
///
/// Returns an error if the file does not exist, permissions are too broad,
/// or parsing fails.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "credentials file does not exist: {}",
            path.display()
        ));
    }

    validate_private_permissions(path)?;

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// Load credentials from `~/.formwright/.env`.
///
/// A missing file yields empty credentials (the no-key state is normal); a
/// present-but-invalid file is an error.
///
/// # Errors
///
/// Returns an error when the home directory cannot be resolved or the
/// credentials file exists but is invalid.
pub fn load_default_credentials() -> anyhow::Result<Credentials> {
    let base_dirs = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot resolve home directory"))?;
    let path = base_dirs.home_dir().join(".formwright").join(".env");
    if !path.exists() {
        debug!(path = %path.display(), "no credentials file, continuing without");
        return Ok(Credentials::default());
    }
    load_credentials(&path)
}

#[cfg(unix)]
fn validate_private_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to inspect credentials file {}", path.display()))?;
    let mode = metadata.permissions().mode() & 0o777;

    if mode & 0o077 != 0 {
        return Err(anyhow::anyhow!(
            "credentials file {} must be 0600, found {:o}",
            path.display(),
            mode
        ));
    }

    Ok(())
}

#[cfg(not(unix))]
fn validate_private_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Semantic API key
// ---------------------------------------------------------------------------

/// An API key for the semantic-matching endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SemanticKey(String);

impl std::fmt::Debug for SemanticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SemanticKey").field(&"[REDACTED]").finish()
    }
}

impl SemanticKey {
    /// Wrap a raw key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the request authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Resolve the semantic API key using a priority chain.
///
/// Resolution order:
/// 1. `OPENAI_API_KEY` from the process environment
/// 2. `OPENAI_API_KEY` from loaded `.env` credentials
///
/// Returns `None` when neither source provides a non-empty value.
pub fn resolve_semantic_key(credentials: &Credentials) -> Option<SemanticKey> {
    if let Ok(key) = std::env::var(SEMANTIC_KEY_VAR) {
        if !key.trim().is_empty() {
            debug!("using {SEMANTIC_KEY_VAR} from process environment");
            return Some(SemanticKey(key));
        }
    }

    if let Some(key) = credentials.get(SEMANTIC_KEY_VAR) {
        if !key.trim().is_empty() {
            debug!("using {SEMANTIC_KEY_VAR} from .env credentials");
            return Some(SemanticKey(key.to_owned()));
        }
    }

    None
}
