//! Fill orchestration: strategy selection, mapping application, outcome.
//!
//! Per invocation the engine runs exactly one strategy's output to
//! completion: semantic when configured and productive, otherwise the
//! deterministic rule matcher. The two are never merged and neither is
//! retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coerce;
use crate::config::FormwrightConfig;
use crate::credentials::{resolve_semantic_key, Credentials};
use crate::extract;
use crate::fields::{FieldMapping, FieldSet};
use crate::matchers::rule::RuleMatcher;
use crate::matchers::semantic::SemanticMatcher;
use crate::matchers::Matcher;
use crate::page::FormPage;

/// The result of one fill pass.
///
/// Zero is a valid, non-error outcome: nothing matched. No finer-grained
/// partial-failure detail is modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// Number of mapping entries applied to resolvable controls.
    pub filled: u64,
}

/// Orchestrates one fill invocation end to end.
///
/// Depends only on the [`Matcher`] capability for the semantic strategy,
/// so tests substitute fakes without touching the orchestration.
pub struct FillEngine {
    semantic: Option<Arc<dyn Matcher>>,
    rule: RuleMatcher,
}

impl FillEngine {
    /// Engine with rule-based matching only.
    pub fn rule_only() -> Self {
        Self {
            semantic: None,
            rule: RuleMatcher,
        }
    }

    /// Engine that consults the given matcher before falling back to rules.
    pub fn with_semantic(matcher: Arc<dyn Matcher>) -> Self {
        Self {
            semantic: Some(matcher),
            rule: RuleMatcher,
        }
    }

    /// Build an engine from config and loaded credentials.
    ///
    /// The semantic strategy is enabled only when an API key resolves; a
    /// missing key is a normal state that routes every fill through the
    /// rule matcher.
    pub fn from_config(config: &FormwrightConfig, credentials: &Credentials) -> Self {
        match resolve_semantic_key(credentials) {
            Some(key) => {
                debug!(model = %config.semantic.model, "semantic matching enabled");
                Self::with_semantic(Arc::new(SemanticMatcher::new(&config.semantic, key)))
            }
            None => {
                debug!("no semantic credential, rule-based matching only");
                Self::rule_only()
            }
        }
    }

    /// Run one fill pass over a page.
    ///
    /// Overlapping invocations against the same page are serialized
    /// through the page's fill gate. Finishes by showing a page notice
    /// with the filled-field count.
    pub async fn fill(&self, page: &FormPage, fields: &FieldSet) -> FillOutcome {
        let _gate = page.acquire_fill_gate().await;
        let descriptors = extract::describe(page);

        if let Some(matcher) = &self.semantic {
            if let Some(mapping) = matcher.resolve(&descriptors, fields).await {
                let filled = apply_mapping(page, &mapping, fields);
                if filled > 0 {
                    info!(filled, strategy = matcher.strategy(), "fill complete");
                    page.notify(format!("Filled {filled} form fields"));
                    return FillOutcome { filled };
                }
                // A semantic result that matches nothing is a failure, not
                // a valid zero outcome.
                debug!("semantic mapping applied no fields, falling back to rules");
            }
        }

        let mapping = self.rule.match_controls(&descriptors, fields);
        let filled = apply_mapping(page, &mapping, fields);
        info!(filled, strategy = "rule", "fill complete");
        page.notify(format!("Filled {filled} form fields"));
        FillOutcome { filled }
    }
}

/// Apply a mapping through the coercer, dropping entries whose control id
/// or field name does not resolve. Returns the applied count.
fn apply_mapping(page: &FormPage, mapping: &FieldMapping, fields: &FieldSet) -> u64 {
    let mut filled: u64 = 0;
    for (control_id, field_name) in mapping.entries() {
        let Some(entry) = fields.get(field_name) else {
            debug!(field_name, "mapping references unknown field, entry dropped");
            continue;
        };
        if coerce::fill_control(page, control_id, entry.value()) {
            filled = filled.saturating_add(1);
        } else {
            debug!(control_id, "mapping references unknown control, entry dropped");
        }
    }
    filled
}
