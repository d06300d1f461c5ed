//! YANG model adapters.
//!
//! Each supported model is one RESTCONF resource whose body wraps an
//! `interface` list under a module-qualified top container. The adapters only
//! unwrap that list; field paths for each model live in `policy`.

use crate::error::{IfcheckError, Result};
use crate::telemetry::{record_from_entry, FieldPath, TelemetryDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YangModel {
    #[serde(rename = "openconfig")]
    OpenConfig,
    CiscoNative,
    Ietf,
}

impl YangModel {
    pub const ALL: [YangModel; 3] = [YangModel::OpenConfig, YangModel::CiscoNative, YangModel::Ietf];

    /// Module-qualified top-level container in the RESTCONF body.
    pub fn top_key(&self) -> &'static str {
        match self {
            YangModel::OpenConfig => "openconfig-interfaces:interfaces",
            YangModel::CiscoNative => "Cisco-IOS-XE-interfaces-oper:interfaces",
            YangModel::Ietf => "ietf-interfaces:interfaces-state",
        }
    }

    /// RESTCONF resource a collector GETs for this model.
    pub fn restconf_path(&self) -> String {
        format!("/restconf/data/{}", self.top_key())
    }

    pub fn detect(body: &Value) -> Option<YangModel> {
        let object = body.as_object()?;
        Self::ALL
            .into_iter()
            .find(|model| object.contains_key(model.top_key()))
    }
}

impl fmt::Display for YangModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YangModel::OpenConfig => write!(f, "openconfig"),
            YangModel::CiscoNative => write!(f, "cisco-native"),
            YangModel::Ietf => write!(f, "ietf"),
        }
    }
}

impl FromStr for YangModel {
    type Err = IfcheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openconfig" | "open-config" | "oc" => Ok(YangModel::OpenConfig),
            "cisco-native" | "cisco" | "native" | "iosxe" => Ok(YangModel::CiscoNative),
            "ietf" => Ok(YangModel::Ietf),
            _ => Err(IfcheckError::Config(format!(
                "unknown YANG model '{}'. Valid values: openconfig, cisco-native, ietf",
                s
            ))),
        }
    }
}

impl TelemetryDocument {
    /// Unwrap a RESTCONF response body for a known model.
    pub fn from_restconf(model: YangModel, body: &Value) -> Result<Self> {
        let container = body.get(model.top_key()).ok_or_else(|| {
            IfcheckError::Schema(format!("missing top-level container '{}'", model.top_key()))
        })?;

        let records = match container.get("interface") {
            // No interfaces configured; some devices omit the list entirely.
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(record_from_entry)
                .collect::<Result<Vec<_>>>()?,
            // Single entry returned without the list wrapper.
            Some(entry @ Value::Object(_)) => vec![record_from_entry(entry)?],
            Some(_) => {
                return Err(IfcheckError::Schema(format!(
                    "'{}.interface' is not a list",
                    model.top_key()
                )))
            }
        };

        Self::new(Some(model), records)
    }

    /// Detect the model from the body, then unwrap it.
    pub fn from_restconf_auto(body: &Value) -> Result<Self> {
        let model = YangModel::detect(body).ok_or_else(|| {
            IfcheckError::Schema(
                "no openconfig, Cisco-native or IETF interfaces container found".to_string(),
            )
        })?;
        Self::from_restconf(model, body)
    }

    /// Read a saved RESTCONF response body. Detects the model when `model` is `None`.
    pub fn load(path: &Path, model: Option<YangModel>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let body: Value = serde_json::from_str(&content)?;
        let document = match model {
            Some(model) => Self::from_restconf(model, &body)?,
            None => Self::from_restconf_auto(&body)?,
        };
        debug!(
            path = %path.display(),
            model = ?document.model,
            interfaces = document.len(),
            "loaded telemetry document"
        );
        Ok(document)
    }
}

/// Value type a leaf is known to carry across the supported models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Counter,
    Text,
}

const TEXT_LEAVES: &[&str] = &[
    "name",
    "type",
    "description",
    "admin-status",
    "oper-status",
    "negotiated-duplex-mode",
    "duplex-mode",
    "mac-address",
    "hw-address",
];

const COUNTER_CONTAINERS: &[&str] = &["counters", "statistics"];

/// Best-effort kind of the leaf a path points at. `None` when unknown.
pub fn field_kind(path: &FieldPath) -> Option<FieldKind> {
    if TEXT_LEAVES.contains(&path.leaf()) {
        return Some(FieldKind::Text);
    }
    match path.parent() {
        Some(parent) if COUNTER_CONTAINERS.contains(&parent) => Some(FieldKind::Counter),
        _ => None,
    }
}
