//! Built-in interface health checks per YANG model.
//!
//! Every counter check fails on any non-zero value unless a threshold
//! override raises it. Checks a model does not carry are simply absent from
//! that model's catalog.

use crate::check::{CheckSpec, Comparison};
use crate::error::{IfcheckError, Result};
use crate::schema::YangModel;
use crate::telemetry::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default threshold for every counter check.
pub const DEFAULT_COUNTER_THRESHOLD: u64 = 0;

const OC_ETHERNET: &str = "openconfig-if-ethernet:ethernet";

/// Counter checks: (id, label, subject used in messages).
const COUNTERS: &[(&str, &str, &str)] = &[
    ("in-crc-errors", "Input CRC errors", "input CRC errors"),
    ("in-fragment-frames", "Input fragment frames", "input fragment frames"),
    ("in-jabber-frames", "Input jabber frames", "input jabber frames"),
    ("in-mac-pause-frames", "Input MAC pause frames", "input MAC pause frames"),
    ("out-mac-pause-frames", "Output MAC pause frames", "output MAC pause frames"),
    ("in-oversize-frames", "Input oversize frames", "input oversize frames"),
    ("in-discards", "Input discards", "input discards"),
    ("in-errors", "Input errors", "input errors"),
    ("in-fcs-errors", "Input FCS errors", "input FCS errors"),
    ("in-unknown-protos", "Input unknown protocols", "input unknown protocols"),
    ("out-discards", "Output discards", "output discards"),
    ("out-errors", "Output errors", "output errors"),
];

/// Where a counter lives for a model, if the model reports it.
fn counter_path(model: YangModel, id: &str) -> Option<String> {
    match model {
        YangModel::OpenConfig => match id {
            "in-crc-errors" | "in-fragment-frames" | "in-jabber-frames"
            | "in-mac-pause-frames" | "out-mac-pause-frames" | "in-oversize-frames" => {
                Some(format!("{}.state.counters.{}", OC_ETHERNET, id))
            }
            _ => Some(format!("state.counters.{}", id)),
        },
        YangModel::CiscoNative => match id {
            "in-crc-errors" | "in-discards" | "in-errors" | "in-unknown-protos"
            | "out-discards" | "out-errors" => Some(format!("statistics.{}", id)),
            _ => None,
        },
        YangModel::Ietf => match id {
            "in-discards" | "in-errors" | "in-unknown-protos" | "out-discards"
            | "out-errors" => Some(format!("statistics.{}", id)),
            _ => None,
        },
    }
}

/// Built-in catalog for a model, in report order.
pub fn catalog(model: YangModel) -> Vec<CheckSpec> {
    let mut checks: Vec<CheckSpec> = COUNTERS
        .iter()
        .filter_map(|(id, label, subject)| {
            let path = counter_path(model, id)?;
            Some(
                CheckSpec::greater_than(id, label, &path, DEFAULT_COUNTER_THRESHOLD).with_messages(
                    &format!("No interfaces have {}", subject),
                    &format!("Some interfaces have {}", subject),
                ),
            )
        })
        .collect();

    let duplex = match model {
        YangModel::OpenConfig => Some((
            format!("{}.state.negotiated-duplex-mode", OC_ETHERNET),
            "FULL",
        )),
        YangModel::CiscoNative => Some((
            "ether-state.negotiated-duplex-mode".to_string(),
            "full-duplex",
        )),
        YangModel::Ietf => None,
    };
    if let Some((path, expected)) = duplex {
        checks.push(
            CheckSpec::not_equal("full-duplex", "Full duplex", &path, expected).with_messages(
                "All interfaces are full duplex",
                "Some interfaces are not full duplex",
            ),
        );
    }

    let (admin, oper) = match model {
        YangModel::OpenConfig => ("state.admin-status", "state.oper-status"),
        YangModel::CiscoNative | YangModel::Ietf => ("admin-status", "oper-status"),
    };
    checks.push(
        CheckSpec::status_match("admin-oper-status", "Admin/oper status", admin, oper, model)
            .with_messages(
                "All interfaces admin / oper state match",
                "Some interfaces are admin / oper state mismatch",
            ),
    );

    // interfaces-state carries no description in the IETF model
    let description = match model {
        YangModel::OpenConfig => Some("config.description"),
        YangModel::CiscoNative => Some("description"),
        YangModel::Ietf => None,
    };
    if let Some(path) = description {
        checks.push(
            CheckSpec::present_non_empty("description", "Description present", path)
                .with_messages(
                    "All interfaces have descriptions",
                    "Some interfaces have no description",
                ),
        );
    }

    checks
}

/// Every check id any model's catalog defines.
pub fn known_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = COUNTERS.iter().map(|(id, _, _)| *id).collect();
    ids.extend(["full-duplex", "admin-oper-status", "description"]);
    ids
}

/// User-defined check, as written in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CustomCheck {
    pub id: String,
    pub label: String,
    /// Restrict to one model; applies to every model when absent.
    #[serde(default)]
    pub model: Option<YangModel>,
    pub path: String,
    pub comparison: CustomComparison,
    #[serde(default)]
    pub threshold: Option<u64>,
    #[serde(default)]
    pub expected: Option<String>,
    /// Oper-status path for `status-match`.
    #[serde(default)]
    pub oper_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomComparison {
    GreaterThan,
    NotEqual,
    Equal,
    PresentNonEmpty,
    StatusMatch,
}

impl fmt::Display for CustomComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomComparison::GreaterThan => "greater-than",
            CustomComparison::NotEqual => "not-equal",
            CustomComparison::Equal => "equal",
            CustomComparison::PresentNonEmpty => "present-non-empty",
            CustomComparison::StatusMatch => "status-match",
        };
        f.write_str(name)
    }
}

impl CustomCheck {
    pub fn applies_to(&self, model: YangModel) -> bool {
        self.model.map_or(true, |m| m == model)
    }

    /// Validate into a `CheckSpec` for `model`.
    pub fn to_spec(&self, model: YangModel) -> Result<CheckSpec> {
        let missing = |field: &str| {
            IfcheckError::invalid_check(
                &self.id,
                format!("'{}' is required for this comparison", field),
            )
        };
        let field_rules = [
            ("threshold", self.threshold.is_some(), self.comparison == CustomComparison::GreaterThan),
            (
                "expected",
                self.expected.is_some(),
                matches!(self.comparison, CustomComparison::NotEqual | CustomComparison::Equal),
            ),
            ("oper-path", self.oper_path.is_some(), self.comparison == CustomComparison::StatusMatch),
        ];
        for (field, set, allowed) in field_rules {
            if set && !allowed {
                return Err(IfcheckError::invalid_check(
                    &self.id,
                    format!("'{}' does not apply to {}", field, self.comparison),
                ));
            }
        }

        let comparison = match self.comparison {
            CustomComparison::GreaterThan => Comparison::GreaterThan {
                threshold: self.threshold.unwrap_or(DEFAULT_COUNTER_THRESHOLD),
            },
            CustomComparison::NotEqual => Comparison::NotEqual {
                expected: self.expected.clone().ok_or_else(|| missing("expected"))?,
            },
            CustomComparison::Equal => Comparison::Equal {
                expected: self.expected.clone().ok_or_else(|| missing("expected"))?,
            },
            CustomComparison::PresentNonEmpty => Comparison::PresentNonEmpty,
            CustomComparison::StatusMatch => {
                let oper = self.oper_path.as_deref().ok_or_else(|| missing("oper-path"))?;
                Comparison::StatusMatch {
                    oper_path: FieldPath::parse(oper).map_err(|_| {
                        IfcheckError::invalid_check(&self.id, format!("invalid path '{}'", oper))
                    })?,
                    model,
                }
            }
        };
        CheckSpec::try_new(&self.id, &self.label, &self.path, comparison)
    }
}

/// Adjustments to the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    /// Check ids to leave out.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Counter thresholds by check id.
    #[serde(default)]
    pub thresholds: BTreeMap<String, u64>,
    #[serde(default)]
    pub checks: Vec<CustomCheck>,
}

impl PolicyOverrides {
    /// Reject overrides naming checks that do not exist anywhere.
    pub fn validate(&self) -> Result<()> {
        let known = known_ids();
        let custom: Vec<&str> = self.checks.iter().map(|c| c.id.as_str()).collect();
        for id in self.thresholds.keys().chain(self.disabled.iter()) {
            if !known.contains(&id.as_str()) && !custom.contains(&id.as_str()) {
                return Err(IfcheckError::Config(format!("unknown check id '{}'", id)));
            }
        }
        for (i, check) in self.checks.iter().enumerate() {
            if known.contains(&check.id.as_str()) || custom[..i].contains(&check.id.as_str()) {
                return Err(IfcheckError::Config(format!(
                    "duplicate check id '{}'",
                    check.id
                )));
            }
            for model in YangModel::ALL.into_iter().filter(|m| check.applies_to(*m)) {
                check.to_spec(model)?;
            }
        }
        // Thresholds must land on counter checks in every catalog they touch
        for model in YangModel::ALL {
            catalog_with(model, self)
                .map_err(|e| IfcheckError::Config(format!("{} catalog: {}", model, e)))?;
        }
        Ok(())
    }
}

/// Catalog for `model` with thresholds, disabled ids and custom checks applied.
pub fn catalog_with(model: YangModel, overrides: &PolicyOverrides) -> Result<Vec<CheckSpec>> {
    let mut checks = Vec::new();
    for check in catalog(model) {
        if overrides.disabled.iter().any(|id| id == check.id()) {
            continue;
        }
        match overrides.thresholds.get(check.id()) {
            Some(&threshold) => checks.push(check.with_threshold(threshold)?),
            None => checks.push(check),
        }
    }

    for custom in overrides.checks.iter().filter(|c| c.applies_to(model)) {
        if overrides.disabled.contains(&custom.id) {
            continue;
        }
        let spec = custom.to_spec(model)?;
        match overrides.thresholds.get(&custom.id) {
            Some(&threshold) => checks.push(spec.with_threshold(threshold)?),
            None => checks.push(spec),
        }
    }

    Ok(checks)
}
