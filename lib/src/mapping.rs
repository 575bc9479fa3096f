//! Translation of backend-native metadata fields into Dublin Core elements.
//!
//! A backend describes each collection with a field schema that maps its own field
//! nicknames onto Dublin Core term codes, and separately publishes the table of term codes
//! with their display labels. [`FieldMapper`] combines the two with an exclusion list of
//! administrative fields and turns a raw record into an ordered list of
//! [`NormalizedField`]s. Anything that does not map cleanly is dropped without error.

use crate::consts::DC_PREFIX;
use crate::rdfxml::is_ncname;
use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Mapping target of one backend field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermMapping {
    /// The field maps to this Dublin Core term code.
    Term(String),
    /// The backend explicitly marks the field as not mapped.
    Unmapped,
}

/// One entry of a collection's field schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchemaEntry {
    pub nickname: String,
    pub mapping: TermMapping,
}

impl FieldSchemaEntry {
    /// Builds an entry from the backend's raw term code, treating `unmapped_sentinel` as
    /// the absence of a mapping.
    pub fn from_code(nickname: &str, code: &str, unmapped_sentinel: &str) -> Self {
        let mapping = if code == unmapped_sentinel {
            TermMapping::Unmapped
        } else {
            TermMapping::Term(code.to_string())
        };
        FieldSchemaEntry {
            nickname: nickname.to_string(),
            mapping,
        }
    }
}

/// Term code to display label, as published by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCoreTermTable {
    labels: HashMap<String, String>,
}

impl DublinCoreTermTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries with the same code replace earlier ones.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let labels = entries
            .into_iter()
            .map(|(code, label)| (code.into(), label.into()))
            .collect();
        Self { labels }
    }

    /// The label for `code`, or `None` if it is unknown or empty.
    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels
            .get(code)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Value of a single field in a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Present(String),
    /// No value. Backends encode this as an empty array; any non-string value counts.
    Absent,
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Present(s.clone()),
            _ => FieldValue::Absent,
        }
    }

    /// The value if it is present and non-empty.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Present(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// A record as returned by the backend, in the backend's field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadataRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawMetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a backend payload. Returns `None` when the payload is not a JSON object,
    /// which is how backends signal a missing record.
    pub fn from_json(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        let fields = object
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect();
        Some(Self { fields })
    }

    pub fn push(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.push((key.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A metadata value attached to a Dublin Core element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedField {
    /// Namespace prefix the element is written under.
    pub prefix: String,
    /// Lowercase element name, e.g. `title`.
    pub label: String,
    pub value: String,
}

impl NormalizedField {
    /// A field in the `dc` namespace.
    pub fn dc(label: impl Into<String>, value: impl Into<String>) -> Self {
        NormalizedField {
            prefix: DC_PREFIX.to_string(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Applies a collection's field schema and the backend's term table to raw records.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    schema: Vec<FieldSchemaEntry>,
    terms: DublinCoreTermTable,
    excluded: HashSet<String>,
}

impl FieldMapper {
    pub fn new(schema: Vec<FieldSchemaEntry>, terms: DublinCoreTermTable) -> Self {
        Self {
            schema,
            terms,
            excluded: HashSet::new(),
        }
    }

    /// Adds administrative field nicknames that must never be published.
    pub fn with_excluded<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, nickname: &str) -> bool {
        self.excluded.contains(nickname)
    }

    /// First schema entry for `nickname`; duplicate nicknames are tolerated.
    fn schema_entry(&self, nickname: &str) -> Option<&FieldSchemaEntry> {
        self.schema.iter().find(|entry| entry.nickname == nickname)
    }

    /// Maps one field, or returns `None` if it should not appear in the output.
    pub fn map_field(&self, nickname: &str, value: &FieldValue) -> Option<NormalizedField> {
        let text = value.as_text()?;
        if self.is_excluded(nickname) {
            return None;
        }
        let code = match &self.schema_entry(nickname)?.mapping {
            TermMapping::Term(code) => code,
            TermMapping::Unmapped => return None,
        };
        let label = self.terms.label(code)?.to_lowercase();
        if !is_ncname(&label) {
            debug!("Skipping field {}: '{}' is not an element name", nickname, label);
            return None;
        }
        Some(NormalizedField::dc(label, text))
    }

    /// Maps every field of `record`, keeping the record's order.
    pub fn map(&self, record: &RawMetadataRecord) -> Vec<NormalizedField> {
        record
            .iter()
            .filter_map(|(nickname, value)| self.map_field(nickname, value))
            .collect()
    }
}
