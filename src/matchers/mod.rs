//! Field-to-control matching strategies.
//!
//! Defines the [`Matcher`] capability and the two implementations:
//!
//! - [`rule::RuleMatcher`] — deterministic first-fit substring heuristics
//! - [`semantic::SemanticMatcher`] — external chat-completion classifier
//!
//! The fill engine depends only on the trait, never on a concrete
//! strategy, so tests substitute fakes freely.

use async_trait::async_trait;
use regex::Regex;

use crate::extract::ControlDescriptor;
use crate::fields::{FieldMapping, FieldSet};

pub mod rule;
pub mod semantic;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while consulting a matching strategy.
///
/// These never escape the matcher boundary as errors: the [`Matcher`] impl
/// logs them and reports "unavailable" (`None`), and the orchestrator falls
/// back to the deterministic strategy.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// HTTP transport failure.
    #[error("matcher request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected structure.
    #[error("matcher response parse error: {0}")]
    Parse(String),
    /// Upstream endpoint responded with an error status.
    #[error("matcher endpoint returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A field-to-control matching capability.
///
/// All implementations must be `Send + Sync` so the engine can hold them
/// across the async boundary of a fill invocation.
#[async_trait]
pub trait Matcher: Send + Sync {
    /// Resolve a mapping for the given controls and fields.
    ///
    /// Returns `None` when the strategy is unavailable or its result is
    /// unusable — never an error. Referential validation of the returned
    /// mapping happens at apply time, not here.
    async fn resolve(
        &self,
        controls: &[ControlDescriptor],
        fields: &FieldSet,
    ) -> Option<FieldMapping>;

    /// Short strategy name for logging.
    fn strategy(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return the body text, or a structured
/// error with a sanitized body.
///
/// # Errors
///
/// Returns `MatchError::Request` on transport failure and
/// `MatchError::HttpStatus` on a non-2xx status.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, MatchError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(MatchError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact secret-shaped tokens, and cap the length of
/// an upstream error body before it reaches logs.
#[doc(hidden)]
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"sk-[A-Za-z0-9_\-]{20,}", r"Bearer [A-Za-z0-9_\-\.]{16,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
