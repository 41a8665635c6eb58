//! In-memory form page model.
//!
//! The engine never touches a live DOM. Embedding hosts build a [`FormPage`]
//! (from a JSON fixture or by hand) and hand it to the fill engine. The model
//! keeps the observable surface of real form controls: value and checked
//! state, option selection, dispatched events, inline background color,
//! sibling rating indicators, and transient page notices.
//!
//! Controls are identified by their `id`; hosts are expected to give every
//! control a unique, non-empty id, since matchers key their mappings on it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How long a page notice stays visible before it expires.
const NOTICE_TTL: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Control model
// ---------------------------------------------------------------------------

/// Element tag of a control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// An `<input>` element.
    #[default]
    Input,
    /// A `<select>` element.
    Select,
    /// A `<textarea>` element.
    Textarea,
}

/// The closed set of control kinds the engine can coerce into.
///
/// Derived from a control's tag, native `type` attribute, and rating
/// markers — see [`Control::kind`]. Serialized with the wire names the
/// semantic classifier contract uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Free-text input.
    Text,
    /// Multi-line text area.
    Textarea,
    /// Single-choice select.
    Select,
    /// Multiple-choice select.
    Multiselect,
    /// Boolean checkbox.
    Checkbox,
    /// Radio button.
    Radio,
    /// Numeric slider with declared bounds.
    Range,
    /// Date-only input.
    Date,
    /// Date-and-time input.
    Datetime,
    /// Discrete rating widget with star indicators.
    Rating,
}

/// A selectable option inside a select control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceOption {
    /// Visible option text.
    pub text: String,
    /// Underlying submit value.
    pub value: String,
    /// Whether the option is currently selected.
    pub selected: bool,
}

impl ChoiceOption {
    /// Option whose value equals its visible text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            text,
            selected: false,
        }
    }
}

/// A sibling rating indicator ("star") element next to a rating control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarIndicator {
    /// The element's class list.
    pub classes: Vec<String>,
}

impl StarIndicator {
    /// Add a class unless already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove every occurrence of a class.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A UI event dispatched on a control after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiEvent {
    /// Continuous-value update, as a keystroke or drag would emit.
    Input,
    /// Committed value change.
    Change,
}

/// An explicit label element on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelNode {
    /// The `for` reference; matches a control id when present.
    pub for_id: Option<String>,
    /// The label's text content.
    pub text: String,
}

impl LabelNode {
    /// Label explicitly referencing a control id.
    pub fn for_control(for_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            for_id: Some(for_id.into()),
            text: text.into(),
        }
    }
}

/// A transient user-visible toast notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Message text.
    pub message: String,
}

/// A single form control.
///
/// All fields are public so fixtures and tests can build controls as struct
/// literals over [`Control::default`]. State fields (`value`, `checked`,
/// `background`, `events`, option/star state) are mutated by the coercer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Control {
    /// Element id; the identity matchers key their mappings on.
    pub id: String,
    /// `name` attribute.
    pub name: String,
    /// `placeholder` attribute.
    pub placeholder: String,
    /// Element tag.
    pub tag: Tag,
    /// Native `type` attribute, meaningful for input tags.
    pub type_attr: Option<String>,
    /// Role attribute.
    pub role: Option<String>,
    /// Class list.
    pub classes: Vec<String>,
    /// Whether a select allows multiple selection.
    pub multiple: bool,
    /// Declared minimum for range controls.
    pub min: Option<f64>,
    /// Declared maximum for range controls.
    pub max: Option<f64>,
    /// Options of a select control, in document order.
    pub options: Vec<ChoiceOption>,
    /// Sibling rating indicator elements, in document order.
    pub stars: Vec<StarIndicator>,
    /// Text of the nearest strictly-containing label element, if any.
    pub enclosing_label: Option<String>,
    /// Current value.
    pub value: String,
    /// Current checked state, for checkbox and radio controls.
    pub checked: bool,
    /// Inline background override; `None` means stylesheet default.
    pub background: Option<String>,
    /// Events dispatched on this control, oldest first.
    pub events: Vec<UiEvent>,
}

impl Control {
    /// Classify this control into the closed [`ControlKind`] set.
    ///
    /// A rating marker (`role="rate"`, or class `rate` or `stars`, on an
    /// input element) wins over the native type; otherwise the tag and the
    /// `type` attribute decide, defaulting to text.
    pub fn kind(&self) -> ControlKind {
        if self.tag == Tag::Input
            && (self.role.as_deref() == Some("rate")
                || self.has_class("rate")
                || self.has_class("stars"))
        {
            return ControlKind::Rating;
        }
        match self.tag {
            Tag::Select => {
                if self.multiple {
                    ControlKind::Multiselect
                } else {
                    ControlKind::Select
                }
            }
            Tag::Textarea => ControlKind::Textarea,
            Tag::Input => match self.type_attr.as_deref() {
                Some("checkbox") => ControlKind::Checkbox,
                Some("radio") => ControlKind::Radio,
                Some("range") => ControlKind::Range,
                Some("date") => ControlKind::Date,
                Some("datetime-local") => ControlKind::Datetime,
                _ => ControlKind::Text,
            },
        }
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Record a dispatched event.
    pub fn dispatch(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    /// Visible texts of the currently selected options.
    pub fn selected_texts(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.text.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Serializable snapshot of a page: the JSON fixture format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDocument {
    /// Controls in document order.
    pub controls: Vec<Control>,
    /// Explicit label elements.
    pub labels: Vec<LabelNode>,
}

#[derive(Debug, Default)]
struct PageState {
    controls: Vec<Control>,
    labels: Vec<LabelNode>,
    notices: Vec<(u64, Notice)>,
    next_notice: u64,
}

/// Cloneable shared handle over one page's form controls.
///
/// All reads and writes go through a single lock; mutation is synchronous
/// and single-writer. The separate async fill gate serializes whole fill
/// invocations so two overlapping fills never interleave their mutations.
#[derive(Clone, Default)]
pub struct FormPage {
    state: Arc<Mutex<PageState>>,
    fill_gate: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for FormPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("FormPage")
            .field("controls", &state.controls.len())
            .field("labels", &state.labels.len())
            .field("notices", &state.notices.len())
            .finish()
    }
}

impl FormPage {
    /// Build a page from controls and explicit labels.
    pub fn new(controls: Vec<Control>, labels: Vec<LabelNode>) -> Self {
        Self::from_document(PageDocument { controls, labels })
    }

    /// Build a page from a deserialized fixture document.
    pub fn from_document(doc: PageDocument) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                controls: doc.controls,
                labels: doc.labels,
                notices: Vec::new(),
                next_notice: 0,
            })),
            fill_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Parse a page from fixture JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when the JSON does not match the
    /// [`PageDocument`] shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<PageDocument>(json).map(Self::from_document)
    }

    /// Snapshot the page back into its fixture document form.
    pub fn to_document(&self) -> PageDocument {
        let state = self.state();
        PageDocument {
            controls: state.controls.clone(),
            labels: state.labels.clone(),
        }
    }

    /// Serialize the current page state as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error on serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of all controls, document order preserved.
    pub fn controls(&self) -> Vec<Control> {
        self.state().controls.clone()
    }

    /// Clone of all explicit label elements.
    pub fn labels(&self) -> Vec<LabelNode> {
        self.state().labels.clone()
    }

    /// Number of controls on the page.
    pub fn control_count(&self) -> usize {
        self.state().controls.len()
    }

    /// Clone of the first control with the given id, if any.
    pub fn control(&self, id: &str) -> Option<Control> {
        self.state().controls.iter().find(|c| c.id == id).cloned()
    }

    /// Mutate the control with the given id; returns the closure's result,
    /// or `None` when no such control exists.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Control) -> R) -> Option<R> {
        let mut state = self.state();
        state.controls.iter_mut().find(|c| c.id == id).map(f)
    }

    /// Acquire the page's fill gate, serializing fill invocations.
    pub(crate) async fn acquire_fill_gate(&self) -> tokio::sync::OwnedMutexGuard<()> {
        Arc::clone(&self.fill_gate).lock_owned().await
    }

    /// Currently visible notices, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.state()
            .notices
            .iter()
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    /// Show a transient toast notice.
    ///
    /// The notice expires after a fixed delay when an async runtime is
    /// available; without one it stays until the page is dropped.
    pub fn notify(&self, message: impl Into<String>) {
        let id = {
            let mut state = self.state();
            let id = state.next_notice;
            state.next_notice = state.next_notice.wrapping_add(1);
            state.notices.push((
                id,
                Notice {
                    message: message.into(),
                },
            ));
            id
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let page = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(NOTICE_TTL).await;
                    page.expire_notice(id);
                });
            }
            Err(_) => debug!("no async runtime, notice will not auto-expire"),
        }
    }

    fn expire_notice(&self, id: u64) {
        self.state().notices.retain(|(nid, _)| *nid != id);
    }
}
