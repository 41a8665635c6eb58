//! Form structure extraction and label resolution.
//!
//! Converts live controls into the normalized [`ControlDescriptor`] form
//! the matchers work with. Read-only: descriptors are built fresh on every
//! fill pass and never persisted.

use serde::{Deserialize, Serialize};

use crate::page::{Control, ControlKind, FormPage, LabelNode};

/// Normalized, serializable summary of one control.
///
/// Serialized with the wire names the semantic classifier contract uses
/// (`type` for the kind; `options` only for select kinds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDescriptor {
    /// Control kind.
    #[serde(rename = "type")]
    pub kind: ControlKind,
    /// `name` attribute.
    pub name: String,
    /// Element id.
    pub id: String,
    /// `placeholder` attribute.
    pub placeholder: String,
    /// Resolved label text; empty when no label was found.
    pub label: String,
    /// Ordered visible option texts, for select kinds only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub options: Option<Vec<String>>,
}

/// Produce one descriptor per control, preserving document order.
pub fn describe(page: &FormPage) -> Vec<ControlDescriptor> {
    let labels = page.labels();
    page.controls()
        .iter()
        .map(|control| describe_control(control, &labels))
        .collect()
}

/// Build the descriptor for a single control against the page's labels.
pub fn describe_control(control: &Control, labels: &[LabelNode]) -> ControlDescriptor {
    let kind = control.kind();
    let options = matches!(kind, ControlKind::Select | ControlKind::Multiselect)
        .then(|| control.options.iter().map(|o| o.text.clone()).collect());
    ControlDescriptor {
        kind,
        name: control.name.clone(),
        id: control.id.clone(),
        placeholder: control.placeholder.clone(),
        label: resolve_label(control, labels).unwrap_or_default(),
        options,
    }
}

/// Resolve the human-readable label associated with a control.
///
/// First match wins: (1) an explicit label whose `for` reference equals the
/// control's id; (2) the nearest strictly-containing ancestor label. No
/// fuzzy or positional inference — a deliberate scope limit. Returned text
/// is trimmed; an all-whitespace label counts as absent.
pub fn resolve_label(control: &Control, labels: &[LabelNode]) -> Option<String> {
    if !control.id.is_empty() {
        let explicit = labels
            .iter()
            .find(|label| label.for_id.as_deref() == Some(control.id.as_str()))
            .map(|label| label.text.trim())
            .filter(|text| !text.is_empty());
        if let Some(text) = explicit {
            return Some(text.to_owned());
        }
    }
    control
        .enclosing_label
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}
