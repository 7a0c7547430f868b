//! Tracked structure entry records.
//!
//! # Responsibility
//! - Hold the user-visible tracked record for one artifact.
//! - Converge the two persisted shapes (JSON mapping value, markdown
//!   front matter) into one in-memory form.
//!
//! # Invariants
//! - Entries are keyed externally by a stable relative path; the key is
//!   never stored inside the entry.
//! - Unknown metadata fields pass through load/save untouched.

use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata field holding the recorded source path.
pub const FIELD_FILE: &str = "code-path";
/// Metadata field holding the recorded start line.
pub const FIELD_LINE: &str = "code-line";
/// Metadata field holding the resolved atom identifier.
pub const FIELD_ATOM_ID: &str = "code-name";
/// Field carrying the prose body in the keyed-JSON shape. The markdown
/// shape stores the body after the front matter block instead.
pub const FIELD_CONTENT: &str = "content";

/// One tracked record, mutated in place by reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureEntry {
    /// Source path as last recorded; may be stale until reconciled.
    pub recorded_file: Option<String>,
    /// Start line as last recorded; may be stale until reconciled.
    pub recorded_line: Option<u32>,
    /// Resolved atom identifier; `None` until reconciliation succeeds.
    pub atom_id: Option<String>,
    /// Remaining metadata fields, preserved verbatim.
    pub metadata: BTreeMap<String, Value>,
    /// Optional prose body (markdown form only).
    pub body: Option<String>,
}

impl StructureEntry {
    /// Builds an entry from one value of the keyed-JSON structure shape.
    ///
    /// Non-object values produce an empty entry; the caller reports those
    /// through reconciliation (missing identity fields) rather than here.
    pub fn from_value(value: &Value) -> Self {
        let mut entry = match value.as_object() {
            Some(map) => Self::from_fields(map.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => Self::default(),
        };
        if let Some(Value::String(content)) = entry.metadata.remove(FIELD_CONTENT) {
            entry.body = Some(content);
        }
        entry
    }

    /// Builds an entry from parsed front matter metadata.
    pub fn from_metadata(metadata: &BTreeMap<String, Value>) -> Self {
        Self::from_fields(metadata.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    fn from_fields(fields: impl Iterator<Item = (String, Value)>) -> Self {
        let mut entry = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                FIELD_FILE => entry.recorded_file = value.as_str().map(str::to_string),
                FIELD_LINE => entry.recorded_line = value.as_u64().map(|l| l as u32),
                FIELD_ATOM_ID => entry.atom_id = value.as_str().map(str::to_string),
                _ => {
                    entry.metadata.insert(key, value);
                }
            }
        }
        entry
    }

    /// Flattens the entry back into the persisted field mapping.
    ///
    /// Identity fields are always present so that a later run can tell
    /// "recorded as absent" apart from "file predates the field".
    pub fn to_metadata(&self) -> BTreeMap<String, Value> {
        let mut map = self.metadata.clone();
        map.insert(
            FIELD_FILE.to_string(),
            self.recorded_file
                .as_deref()
                .map_or(Value::Null, |f| Value::String(f.to_string())),
        );
        map.insert(
            FIELD_LINE.to_string(),
            self.recorded_line.map_or(Value::Null, |l| Value::from(l)),
        );
        map.insert(
            FIELD_ATOM_ID.to_string(),
            self.atom_id
                .as_deref()
                .map_or(Value::Null, |n| Value::String(n.to_string())),
        );
        map
    }

    /// Flattens the entry into a JSON object for the keyed-JSON shape.
    pub fn to_value(&self) -> Value {
        let mut map = self.to_metadata();
        if let Some(body) = &self.body {
            map.insert(FIELD_CONTENT.to_string(), Value::String(body.clone()));
        }
        Value::Object(map.into_iter().collect())
    }
}
