//! Caller-supplied field values and the mapping types matchers produce.
//!
//! A [`FieldSet`] preserves the insertion order of its entries: rule-based
//! matching gives the FIRST declared field precedence, so losing the order
//! to a hash map would change observable results. JSON (de)serialization
//! goes through custom map visitors to keep document order regardless of
//! `serde_json` feature flags.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Field entries
// ---------------------------------------------------------------------------

/// A named value supplied by the caller: a bare string or a structured
/// value carrying producer hints.
///
/// The hints are informational; coercion is driven by the *control's* kind,
/// and [`FieldEntry::value`] is always the canonical string to coerce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    /// Bare string value.
    Bare(String),
    /// Structured value with optional producer hints.
    Structured(FieldSpec),
}

/// The structured form of a field entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// The canonical string value to coerce.
    pub value: String,
    /// The producer's intended coercion hint, e.g. `"select"`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    /// Choice options the producer extracted alongside the value.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub options: Option<Vec<String>>,
    /// Extra type-specific details.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl FieldEntry {
    /// The canonical string value to coerce, regardless of form.
    pub fn value(&self) -> &str {
        match self {
            Self::Bare(value) => value,
            Self::Structured(spec) => &spec.value,
        }
    }
}

impl From<&str> for FieldEntry {
    fn from(value: &str) -> Self {
        Self::Bare(value.to_owned())
    }
}

impl From<String> for FieldEntry {
    fn from(value: String) -> Self {
        Self::Bare(value)
    }
}

impl From<FieldSpec> for FieldEntry {
    fn from(spec: FieldSpec) -> Self {
        Self::Structured(spec)
    }
}

// ---------------------------------------------------------------------------
// Field set
// ---------------------------------------------------------------------------

/// Insertion-ordered field-name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(String, FieldEntry)>,
}

impl FieldSet {
    /// Empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing entry in place (the original
    /// position is kept, matching JSON object re-assignment semantics).
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<FieldEntry>) {
        let name = name.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((name, entry)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a field set from JSON.
    ///
    /// Accepts either a bare `{name: value}` object or the stored
    /// field-data document shape (`{"fields": {…}, "formName": …}`): a
    /// top-level object containing a `fields` object member is treated as
    /// a document.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when neither shape parses.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let probe: serde_json::Value = serde_json::from_str(json)?;
        if probe.get("fields").is_some_and(serde_json::Value::is_object) {
            return serde_json::from_str::<FieldDocument>(json).map(|doc| doc.fields);
        }
        serde_json::from_str(json)
    }
}

impl<N: Into<String>, E: Into<FieldEntry>> FromIterator<(N, E)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (N, E)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, entry) in iter {
            set.insert(name, entry);
        }
        set
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

struct FieldSetVisitor;

impl<'de> Visitor<'de> for FieldSetVisitor {
    type Value = FieldSet;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of field names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = FieldSet::new();
        while let Some((name, entry)) = access.next_entry::<String, FieldEntry>()? {
            set.insert(name, entry);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldSetVisitor)
    }
}

/// A stored field-data document, as upstream producers export field sets.
///
/// Only `fields` matters to the engine; the rest is provenance the storage
/// collaborator owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDocument {
    /// Display name of the captured form.
    pub form_name: Option<String>,
    /// Where the field data came from.
    pub source: Option<String>,
    /// Capture time, milliseconds since epoch.
    pub timestamp: Option<i64>,
    /// The fields themselves.
    pub fields: FieldSet,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Ordered control-id → field-name association produced by one matcher.
///
/// Entries are applied in order; referential integrity against the live
/// page is checked at apply time, where unresolvable entries are dropped
/// silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a control id to a field name, replacing an existing entry for
    /// the same control in place.
    pub fn insert(&mut self, control_id: impl Into<String>, field_name: impl Into<String>) {
        let control_id = control_id.into();
        let field_name = field_name.into();
        match self.entries.iter_mut().find(|(id, _)| *id == control_id) {
            Some((_, existing)) => *existing = field_name,
            None => self.entries.push((control_id, field_name)),
        }
    }

    /// The field name mapped to a control, if any.
    pub fn get(&self, control_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == control_id)
            .map(|(_, name)| name.as_str())
    }

    /// Iterate `(control_id, field_name)` entries in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (control_id, field_name) in &self.entries {
            map.serialize_entry(control_id, field_name)?;
        }
        map.end()
    }
}

struct FieldMappingVisitor;

impl<'de> Visitor<'de> for FieldMappingVisitor {
    type Value = FieldMapping;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of control ids to field names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut mapping = FieldMapping::new();
        while let Some((control_id, field_name)) = access.next_entry::<String, String>()? {
            mapping.insert(control_id, field_name);
        }
        Ok(mapping)
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMappingVisitor)
    }
}
