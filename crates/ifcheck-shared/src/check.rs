//! Declarative check definitions.

use crate::error::{IfcheckError, Result};
use crate::schema::{field_kind, FieldKind, YangModel};
use crate::telemetry::FieldPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an observed value is judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Comparison {
    /// Fail when the counter exceeds `threshold`.
    GreaterThan { threshold: u64 },
    /// Fail when the string differs from `expected`.
    NotEqual { expected: String },
    /// Fail when the string equals `expected`.
    Equal { expected: String },
    /// Fail when the leaf is absent or an empty string.
    PresentNonEmpty,
    /// Check path holds admin-status; fail when `oper_path` is not the mapped state.
    StatusMatch { oper_path: FieldPath, model: YangModel },
}

impl Comparison {
    fn expects(&self) -> FieldKind {
        match self {
            Comparison::GreaterThan { .. } => FieldKind::Counter,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::GreaterThan { threshold } => write!(f, "> {}", threshold),
            Comparison::NotEqual { expected } => write!(f, "!= \"{}\"", expected),
            Comparison::Equal { expected } => write!(f, "== \"{}\"", expected),
            Comparison::PresentNonEmpty => write!(f, "present and non-empty"),
            Comparison::StatusMatch { oper_path, model } => {
                write!(f, "matches {} ({} mapping)", oper_path, model)
            }
        }
    }
}

/// Pass/fail wording for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictMessages {
    pub pass: String,
    pub fail: String,
}

/// One evaluation rule. Immutable once built; only `try_new` creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSpec {
    id: String,
    label: String,
    path: FieldPath,
    comparison: Comparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<VerdictMessages>,
}

impl CheckSpec {
    /// Validate and build a check.
    ///
    /// Rejects empty ids/labels, unparsable paths, and comparisons that do not
    /// fit the kind of leaf the path is known to carry.
    pub fn try_new(
        id: impl Into<String>,
        label: impl Into<String>,
        path: &str,
        comparison: Comparison,
    ) -> Result<Self> {
        let id = id.into();
        let label = label.into();

        if id.trim().is_empty() {
            return Err(IfcheckError::invalid_check(id, "empty id"));
        }
        if label.trim().is_empty() {
            return Err(IfcheckError::invalid_check(id, "empty label"));
        }
        let path = FieldPath::parse(path)
            .map_err(|_| IfcheckError::invalid_check(&id, format!("invalid path '{}'", path)))?;

        if let Some(kind) = field_kind(&path) {
            if kind != comparison.expects() {
                return Err(IfcheckError::invalid_check(
                    &id,
                    format!("comparison '{}' does not apply to '{}'", comparison, path),
                ));
            }
        }
        if let Comparison::StatusMatch { oper_path, .. } = &comparison {
            if *oper_path == path {
                return Err(IfcheckError::invalid_check(
                    &id,
                    "admin and oper paths are identical",
                ));
            }
        }

        Ok(Self {
            id,
            label,
            path,
            comparison,
            messages: None,
        })
    }

    /// Build a check known to be valid. Panics otherwise.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        path: &str,
        comparison: Comparison,
    ) -> Self {
        match Self::try_new(id, label, path, comparison) {
            Ok(spec) => spec,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn greater_than(id: &str, label: &str, path: &str, threshold: u64) -> Self {
        Self::new(id, label, path, Comparison::GreaterThan { threshold })
    }

    pub fn not_equal(id: &str, label: &str, path: &str, expected: &str) -> Self {
        Self::new(
            id,
            label,
            path,
            Comparison::NotEqual {
                expected: expected.to_string(),
            },
        )
    }

    pub fn equal(id: &str, label: &str, path: &str, expected: &str) -> Self {
        Self::new(
            id,
            label,
            path,
            Comparison::Equal {
                expected: expected.to_string(),
            },
        )
    }

    pub fn present_non_empty(id: &str, label: &str, path: &str) -> Self {
        Self::new(id, label, path, Comparison::PresentNonEmpty)
    }

    pub fn status_match(
        id: &str,
        label: &str,
        admin_path: &str,
        oper_path: &str,
        model: YangModel,
    ) -> Self {
        let oper_path = match FieldPath::parse(oper_path) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        };
        Self::new(id, label, admin_path, Comparison::StatusMatch { oper_path, model })
    }

    pub fn with_messages(mut self, pass: &str, fail: &str) -> Self {
        self.messages = Some(VerdictMessages {
            pass: pass.to_string(),
            fail: fail.to_string(),
        });
        self
    }

    /// Same check with a different counter threshold.
    pub fn with_threshold(&self, threshold: u64) -> Result<Self> {
        match self.comparison {
            Comparison::GreaterThan { .. } => Ok(Self {
                comparison: Comparison::GreaterThan { threshold },
                ..self.clone()
            }),
            _ => Err(IfcheckError::invalid_check(
                &self.id,
                "threshold only applies to counter checks",
            )),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn messages(&self) -> Option<&VerdictMessages> {
        self.messages.as_ref()
    }
}
