//! Deterministic substring-based field matching.

use async_trait::async_trait;

use crate::extract::ControlDescriptor;
use crate::fields::{FieldMapping, FieldSet};

use super::Matcher;

/// First-fit substring matcher.
///
/// Iterates controls in document order; for each control, the first field
/// (in insertion order) whose lowercased name is a substring of the
/// control's lowercased name, id, label, or placeholder wins, and the
/// control is not reconsidered for later fields. No backtracking, no
/// best-match scoring. Output is bit-identical across runs for identical
/// input: iteration is Vec-backed on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatcher;

impl RuleMatcher {
    /// Produce a mapping for the given controls and fields.
    ///
    /// Controls with no matching field receive no entry; the result may be
    /// empty but the matcher itself cannot fail.
    pub fn match_controls(&self, controls: &[ControlDescriptor], fields: &FieldSet) -> FieldMapping {
        let mut mapping = FieldMapping::new();
        for control in controls {
            let name = control.name.to_lowercase();
            let id = control.id.to_lowercase();
            let label = control.label.to_lowercase();
            let placeholder = control.placeholder.to_lowercase();

            for (field_name, _) in fields.iter() {
                let needle = field_name.to_lowercase();
                if name.contains(&needle)
                    || id.contains(&needle)
                    || label.contains(&needle)
                    || placeholder.contains(&needle)
                {
                    mapping.insert(&control.id, field_name);
                    break;
                }
            }
        }
        mapping
    }
}

#[async_trait]
impl Matcher for RuleMatcher {
    async fn resolve(
        &self,
        controls: &[ControlDescriptor],
        fields: &FieldSet,
    ) -> Option<FieldMapping> {
        Some(self.match_controls(controls, fields))
    }

    fn strategy(&self) -> &'static str {
        "rule"
    }
}
