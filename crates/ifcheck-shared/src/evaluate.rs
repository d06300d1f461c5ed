//! Threshold evaluation over a telemetry document.
//!
//! `evaluate` is pure: one result per interface, in document order, and no
//! error ever escapes. Anything the evaluator cannot judge for one interface
//! becomes `Verdict::NotApplicable` with the reason attached.

use crate::check::{CheckSpec, Comparison};
use crate::schema::YangModel;
use crate::status::status_matches;
use crate::telemetry::{EntityRecord, FieldPath, Lookup, Observed, TelemetryDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    NotApplicable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Passed"),
            Verdict::Fail => write!(f, "Failed"),
            Verdict::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Why an interface could not be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaReason {
    /// The leaf is absent.
    MissingField,
    /// A container above the leaf is absent.
    MissingContainer,
    /// A counter check found a value that is not a non-negative integer.
    NotNumeric,
    /// A string check found a non-string value.
    NotText,
    /// The admin status has no mapping for the model.
    UnmappedStatus,
}

impl fmt::Display for NaReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NaReason::MissingField => "field not reported",
            NaReason::MissingContainer => "container not reported",
            NaReason::NotNumeric => "value is not a counter",
            NaReason::NotText => "value is not a string",
            NaReason::UnmappedStatus => "admin status has no mapping",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub entity_name: String,
    pub observed: Option<Observed>,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NaReason>,
}

impl CheckResult {
    fn pass(name: &str, observed: Observed) -> Self {
        Self {
            entity_name: name.to_string(),
            observed: Some(observed),
            verdict: Verdict::Pass,
            reason: None,
        }
    }

    fn fail(name: &str, observed: Option<Observed>) -> Self {
        Self {
            entity_name: name.to_string(),
            observed,
            verdict: Verdict::Fail,
            reason: None,
        }
    }

    fn not_applicable(name: &str, observed: Option<Observed>, reason: NaReason) -> Self {
        Self {
            entity_name: name.to_string(),
            observed,
            verdict: Verdict::NotApplicable,
            reason: Some(reason),
        }
    }

    fn judged(name: &str, observed: Observed, failed: bool) -> Self {
        if failed {
            Self::fail(name, Some(observed))
        } else {
            Self::pass(name, observed)
        }
    }
}

/// All results of one check over one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub check_id: String,
    pub check_label: String,
    pub results: Vec<CheckResult>,
    pub any_failed: bool,
    /// Pass or fail wording matching `any_failed`.
    pub message: String,
}

impl AggregateResult {
    fn new(check: &CheckSpec, results: Vec<CheckResult>) -> Self {
        let any_failed = results.iter().any(|r| r.verdict == Verdict::Fail);
        let message = match (check.messages(), any_failed) {
            (Some(m), true) => m.fail.clone(),
            (Some(m), false) => m.pass.clone(),
            (None, true) => {
                let failed = results.iter().filter(|r| r.verdict == Verdict::Fail).count();
                format!(
                    "{}: {} interface{} failed",
                    check.label(),
                    failed,
                    if failed == 1 { "" } else { "s" }
                )
            }
            (None, false) => format!("{}: no interfaces failed", check.label()),
        };

        Self {
            check_id: check.id().to_string(),
            check_label: check.label().to_string(),
            results,
            any_failed,
            message,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.with_verdict(Verdict::Fail)
    }

    pub fn passed(&self) -> impl Iterator<Item = &CheckResult> {
        self.with_verdict(Verdict::Pass)
    }

    pub fn not_applicable(&self) -> impl Iterator<Item = &CheckResult> {
        self.with_verdict(Verdict::NotApplicable)
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.with_verdict(verdict).count()
    }

    /// No interface could be judged (empty document or every result N/A).
    pub fn is_vacuous(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.verdict == Verdict::NotApplicable)
    }

    fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(move |r| r.verdict == verdict)
    }
}

/// Apply one check to every interface of a document.
///
/// An empty document yields no results and `any_failed == false`: nothing to
/// check is not a failure.
pub fn evaluate(document: &TelemetryDocument, check: &CheckSpec) -> AggregateResult {
    let results = document
        .records()
        .iter()
        .map(|record| evaluate_record(record, check))
        .collect();
    AggregateResult::new(check, results)
}

/// Apply several checks in order.
pub fn evaluate_catalog(document: &TelemetryDocument, checks: &[CheckSpec]) -> Vec<AggregateResult> {
    checks.iter().map(|check| evaluate(document, check)).collect()
}

fn evaluate_record(record: &EntityRecord, check: &CheckSpec) -> CheckResult {
    let name = record.name.as_str();
    let lookup = record.resolve(check.path());

    match check.comparison() {
        Comparison::GreaterThan { threshold } => {
            let value = match found(name, lookup) {
                Ok(v) => v,
                Err(na) => return na,
            };
            match as_counter(value) {
                Some(n) => CheckResult::judged(name, Observed::Counter(n), n > *threshold),
                None => CheckResult::not_applicable(name, Some(raw(value)), NaReason::NotNumeric),
            }
        }
        Comparison::NotEqual { expected } => {
            text_comparison(name, lookup, |observed| observed != expected.as_str())
        }
        Comparison::Equal { expected } => {
            text_comparison(name, lookup, |observed| observed == expected.as_str())
        }
        Comparison::PresentNonEmpty => match lookup {
            Lookup::Found(Value::String(s)) => {
                CheckResult::judged(name, Observed::Text(s.clone()), s.is_empty())
            }
            Lookup::Found(other) => {
                CheckResult::not_applicable(name, Some(raw(other)), NaReason::NotText)
            }
            Lookup::MissingLeaf => CheckResult::fail(name, None),
            Lookup::MissingContainer => {
                CheckResult::not_applicable(name, None, NaReason::MissingContainer)
            }
        },
        Comparison::StatusMatch { oper_path, model } => {
            status_comparison(record, lookup, oper_path, *model)
        }
    }
}

/// Turn a lookup into the found value or the N/A result for a missing path.
fn found<'a>(name: &str, lookup: Lookup<'a>) -> Result<&'a Value, CheckResult> {
    match lookup {
        Lookup::Found(value) => Ok(value),
        Lookup::MissingLeaf => Err(CheckResult::not_applicable(
            name,
            None,
            NaReason::MissingField,
        )),
        Lookup::MissingContainer => Err(CheckResult::not_applicable(
            name,
            None,
            NaReason::MissingContainer,
        )),
    }
}

fn text_comparison(name: &str, lookup: Lookup<'_>, fails: impl Fn(&str) -> bool) -> CheckResult {
    let value = match found(name, lookup) {
        Ok(v) => v,
        Err(na) => return na,
    };
    match value.as_str() {
        Some(s) => CheckResult::judged(name, Observed::Text(s.to_string()), fails(s)),
        None => CheckResult::not_applicable(name, Some(raw(value)), NaReason::NotText),
    }
}

fn status_comparison(
    record: &EntityRecord,
    admin_lookup: Lookup<'_>,
    oper_path: &FieldPath,
    model: YangModel,
) -> CheckResult {
    let name = record.name.as_str();
    let admin = match found(name, admin_lookup) {
        Ok(v) => v,
        Err(na) => return na,
    };
    let oper = match found(name, record.resolve(oper_path)) {
        Ok(v) => v,
        Err(na) => return na,
    };
    let (admin, oper) = match (admin.as_str(), oper.as_str()) {
        (Some(a), Some(o)) => (a, o),
        _ => {
            let observed = Observed::Text(format!("{}/{}", raw(admin), raw(oper)));
            return CheckResult::not_applicable(name, Some(observed), NaReason::NotText);
        }
    };

    let observed = Observed::Text(format!("{}/{}", admin, oper));
    match status_matches(model, admin, oper) {
        Some(matched) => CheckResult::judged(name, observed, !matched),
        None => CheckResult::not_applicable(name, Some(observed), NaReason::UnmappedStatus),
    }
}

/// Counters arrive as JSON integers or, for 64-bit leaves, decimal strings.
fn as_counter(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    }
}

fn raw(value: &Value) -> Observed {
    match value {
        Value::String(s) => Observed::Text(s.clone()),
        other => Observed::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> TelemetryDocument {
        TelemetryDocument::from_json(&value).unwrap()
    }

    fn discards() -> CheckSpec {
        CheckSpec::greater_than("in-discards", "Input discards", "state.counters.in-discards", 0)
    }

    #[test]
    fn test_counter_above_threshold_fails() {
        let result = evaluate(
            &doc(json!([{"name": "Gi0/1", "state": {"counters": {"in-discards": 5}}}])),
            &discards(),
        );
        assert_eq!(
            result.results,
            vec![CheckResult {
                entity_name: "Gi0/1".to_string(),
                observed: Some(Observed::Counter(5)),
                verdict: Verdict::Fail,
                reason: None,
            }]
        );
        assert!(result.any_failed);
    }

    #[test]
    fn test_zero_counter_passes() {
        let result = evaluate(
            &doc(json!([{"name": "Gi0/2", "state": {"counters": {"in-discards": 0}}}])),
            &discards(),
        );
        assert_eq!(result.results[0].verdict, Verdict::Pass);
        assert_eq!(result.results[0].observed, Some(Observed::Counter(0)));
        assert!(!result.any_failed);
    }

    #[test]
    fn test_absent_counter_is_not_applicable() {
        let result = evaluate(&doc(json!([{"name": "Gi0/3", "state": {}}])), &discards());
        assert_eq!(result.results[0].verdict, Verdict::NotApplicable);
        assert_eq!(result.results[0].observed, None);
        assert_eq!(result.results[0].reason, Some(NaReason::MissingContainer));
        assert!(!result.any_failed);
    }

    #[test]
    fn test_string_counter_coerced() {
        let result = evaluate(
            &doc(json!([
                {"name": "a", "state": {"counters": {"in-discards": "18446744073709551615"}}},
                {"name": "b", "state": {"counters": {"in-discards": "0"}}},
                {"name": "c", "state": {"counters": {"in-discards": "lots"}}},
                {"name": "d", "state": {"counters": {"in-discards": -1}}},
                {"name": "e", "state": {"counters": {"in-discards": " 3"}}}
            ])),
            &discards(),
        );
        let verdicts: Vec<_> = result.results.iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Fail,
                Verdict::Pass,
                Verdict::NotApplicable,
                Verdict::NotApplicable,
                Verdict::NotApplicable
            ]
        );
        assert_eq!(result.results[2].reason, Some(NaReason::NotNumeric));
        assert_eq!(result.results[2].observed, Some(Observed::Text("lots".to_string())));
    }

    #[test]
    fn test_duplex_not_full_fails() {
        let check = CheckSpec::not_equal(
            "full-duplex",
            "Full duplex",
            "ethernet.state.negotiated-duplex-mode",
            "FULL",
        );
        let result = evaluate(
            &doc(json!([
                {"name": "Gi0/4", "ethernet": {"state": {"negotiated-duplex-mode": "HALF"}}},
                {"name": "Gi0/5", "ethernet": {"state": {"negotiated-duplex-mode": "FULL"}}},
                {"name": "Gi0/6", "ethernet": {"state": {"negotiated-duplex-mode": "full"}}}
            ])),
            &check,
        );
        assert_eq!(result.results[0].verdict, Verdict::Fail);
        assert_eq!(result.results[1].verdict, Verdict::Pass);
        // No case folding
        assert_eq!(result.results[2].verdict, Verdict::Fail);
    }

    #[test]
    fn test_equal_comparison_fails_on_match() {
        let check = CheckSpec::equal("not-down", "Not down", "state.oper-status", "DOWN");
        let result = evaluate(
            &doc(json!([
                {"name": "a", "state": {"oper-status": "DOWN"}},
                {"name": "b", "state": {"oper-status": "UP"}},
                {"name": "c", "state": {"oper-status": 1}}
            ])),
            &check,
        );
        assert_eq!(result.count(Verdict::Fail), 1);
        assert_eq!(result.count(Verdict::Pass), 1);
        assert_eq!(result.results[2].reason, Some(NaReason::NotText));
    }

    #[test]
    fn test_description_presence() {
        let check = CheckSpec::present_non_empty("description", "Description", "config.description");
        let result = evaluate(
            &doc(json!([
                {"name": "a", "config": {"description": "uplink"}},
                {"name": "b", "config": {"description": ""}},
                {"name": "c", "config": {}},
                {"name": "d"}
            ])),
            &check,
        );
        let verdicts: Vec<_> = result.results.iter().map(|r| r.verdict).collect();
        assert_eq!(
            verdicts,
            vec![Verdict::Pass, Verdict::Fail, Verdict::Fail, Verdict::NotApplicable]
        );
        assert_eq!(result.results[2].observed, None);
    }

    #[test]
    fn test_status_match_openconfig() {
        let check = CheckSpec::status_match(
            "admin-oper-status",
            "Admin/oper status",
            "state.admin-status",
            "state.oper-status",
            YangModel::OpenConfig,
        );
        let result = evaluate(
            &doc(json!([
                {"name": "a", "state": {"admin-status": "UP", "oper-status": "UP"}},
                {"name": "b", "state": {"admin-status": "UP", "oper-status": "DOWN"}},
                {"name": "c", "state": {"admin-status": "UP"}},
                {"name": "d", "state": {"admin-status": "WEIRD", "oper-status": "UP"}}
            ])),
            &check,
        );
        assert_eq!(result.results[0].verdict, Verdict::Pass);
        assert_eq!(result.results[1].verdict, Verdict::Fail);
        assert_eq!(
            result.results[1].observed,
            Some(Observed::Text("UP/DOWN".to_string()))
        );
        assert_eq!(result.results[2].reason, Some(NaReason::MissingField));
        assert_eq!(result.results[3].reason, Some(NaReason::UnmappedStatus));
    }

    #[test]
    fn test_status_match_cisco_native() {
        let check = CheckSpec::status_match(
            "admin-oper-status",
            "Admin/oper status",
            "admin-status",
            "oper-status",
            YangModel::CiscoNative,
        );
        let result = evaluate(
            &doc(json!([
                {"name": "Gi1", "admin-status": "if-state-up", "oper-status": "if-oper-state-ready"},
                {"name": "Gi2", "admin-status": "if-state-up", "oper-status": "if-oper-state-no-pass"}
            ])),
            &check,
        );
        assert_eq!(result.results[0].verdict, Verdict::Pass);
        assert_eq!(result.results[1].verdict, Verdict::Fail);
    }

    #[test]
    fn test_empty_document_is_vacuous_pass() {
        let result = evaluate(&TelemetryDocument::default(), &discards());
        assert!(result.results.is_empty());
        assert!(!result.any_failed);
        assert!(result.is_vacuous());
    }

    #[test]
    fn test_messages_follow_verdict() {
        let check = discards().with_messages("No interfaces have input discards", "Some interfaces have input discards");
        let failing = doc(json!([{"name": "a", "state": {"counters": {"in-discards": 2}}}]));
        let passing = doc(json!([{"name": "a", "state": {"counters": {"in-discards": 0}}}]));
        assert_eq!(evaluate(&failing, &check).message, "Some interfaces have input discards");
        assert_eq!(evaluate(&passing, &check).message, "No interfaces have input discards");
        assert_eq!(evaluate(&failing, &discards()).message, "Input discards: 1 interface failed");
    }

    #[test]
    fn test_evaluate_catalog_keeps_check_order() {
        let checks = vec![
            discards(),
            CheckSpec::greater_than("out-discards", "Output discards", "state.counters.out-discards", 0),
        ];
        let results = evaluate_catalog(
            &doc(json!([{"name": "a", "state": {"counters": {"in-discards": 0, "out-discards": 1}}}])),
            &checks,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].check_id, "in-discards");
        assert!(!results[0].any_failed);
        assert!(results[1].any_failed);
    }
}
