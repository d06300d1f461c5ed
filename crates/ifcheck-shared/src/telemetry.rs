//! Telemetry documents: interface records keyed by name.
//!
//! A record keeps the raw JSON object the device returned for one interface.
//! Fields are looked up by dotted path; a missing field is reported as such and
//! never confused with a zero counter.

use crate::error::{IfcheckError, Result};
use crate::schema::YangModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Dotted path into an interface record, e.g. `state.counters.in-discards`.
///
/// Segments may contain `-` and `:` (YANG module prefixes), never `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(IfcheckError::InvalidPath(path.to_string()));
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(IfcheckError::InvalidPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment (the leaf name).
    pub fn leaf(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segment directly above the leaf, if any.
    pub fn parent(&self) -> Option<&str> {
        let n = self.segments.len();
        (n >= 2).then(|| self.segments[n - 2].as_str())
    }
}

impl FromStr for FieldPath {
    type Err = IfcheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = IfcheckError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> String {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Outcome of resolving a path against one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    /// Every container exists but the leaf itself is absent (or null).
    MissingLeaf,
    /// A container along the path is absent or not an object.
    MissingContainer,
}

/// One interface as reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub data: Value,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn resolve(&self, path: &FieldPath) -> Lookup<'_> {
        let segments = path.segments();
        let (leaf, containers) = match segments.split_last() {
            Some(split) => split,
            None => return Lookup::MissingContainer,
        };

        let mut current = &self.data;
        for segment in containers {
            match current.get(segment.as_str()) {
                Some(next) if next.is_object() => current = next,
                _ => return Lookup::MissingContainer,
            }
        }

        if !current.is_object() {
            return Lookup::MissingContainer;
        }
        match current.get(leaf.as_str()) {
            Some(Value::Null) | None => Lookup::MissingLeaf,
            Some(value) => Lookup::Found(value),
        }
    }
}

/// Ordered interface records from a single device response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetryDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<YangModel>,
    records: Vec<EntityRecord>,
}

impl TelemetryDocument {
    /// Build a document, rejecting empty or duplicate interface names.
    pub fn new(model: Option<YangModel>, records: Vec<EntityRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.name.is_empty() {
                return Err(IfcheckError::Schema("interface with empty name".to_string()));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(IfcheckError::Schema(format!(
                    "duplicate interface name '{}'",
                    record.name
                )));
            }
        }
        Ok(Self { model, records })
    }

    /// Build from a JSON array of objects that each carry a string `name`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let entries = value
            .as_array()
            .ok_or_else(|| IfcheckError::Schema("expected a list of interfaces".to_string()))?;
        let records = entries
            .iter()
            .map(record_from_entry)
            .collect::<Result<Vec<_>>>()?;
        Self::new(None, records)
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }
}

pub(crate) fn record_from_entry(entry: &Value) -> Result<EntityRecord> {
    if !entry.is_object() {
        return Err(IfcheckError::Schema(
            "interface entry is not an object".to_string(),
        ));
    }
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| IfcheckError::Schema("interface entry without a name".to_string()))?;
    Ok(EntityRecord::new(name, entry.clone()))
}

/// Observed value as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observed {
    Counter(u64),
    Text(String),
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Counter(n) => write!(f, "{}", n),
            Observed::Text(s) => write!(f, "{}", s),
        }
    }
}
