//! Evaluator behaviour over hand-built and randomized documents.
//!
//! ## Properties Tested
//!
//! - One result per interface, in document order
//! - `any_failed` is true iff some result is Fail
//! - Zero counters pass, absent counters are N/A
//! - Evaluating twice gives identical results

use ifcheck_shared::{
    evaluate, CheckSpec, NaReason, Observed, TelemetryDocument, Verdict,
};
use serde_json::{json, Value};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// xorshift64, enough to vary documents deterministically
struct TestRng {
    state: u64,
}

impl TestRng {
    fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { 1 } else { seed } }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min { return min; }
        min + (self.next_u64() % (max - min))
    }
}

fn discards_check() -> CheckSpec {
    CheckSpec::greater_than("in-discards", "Input discards", "state.counters.in-discards", 0)
}

fn doc(value: Value) -> TelemetryDocument {
    TelemetryDocument::from_json(&value).unwrap()
}

/// Interface entry with a random shape: counter, zero, string counter,
/// garbage, missing leaf or missing container.
fn random_interface(rng: &mut TestRng, index: usize) -> Value {
    let name = format!("Gi0/{}", index);
    match rng.next_range(0, 6) {
        0 => json!({"name": name, "state": {"counters": {"in-discards": rng.next_range(1, 1000)}}}),
        1 => json!({"name": name, "state": {"counters": {"in-discards": 0}}}),
        2 => json!({"name": name, "state": {"counters": {"in-discards": rng.next_range(0, 5).to_string()}}}),
        3 => json!({"name": name, "state": {"counters": {"in-discards": "n/a"}}}),
        4 => json!({"name": name, "state": {"counters": {}}}),
        _ => json!({"name": name}),
    }
}

fn random_document(rng: &mut TestRng) -> TelemetryDocument {
    let len = rng.next_range(0, 40) as usize;
    let entries: Vec<Value> = (0..len).map(|i| random_interface(rng, i)).collect();
    doc(Value::Array(entries))
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_nonzero_discards_fail() {
    let result = evaluate(
        &doc(json!([{"name": "Gi0/1", "state": {"counters": {"in-discards": 5}}}])),
        &discards_check(),
    );
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].entity_name, "Gi0/1");
    assert_eq!(result.results[0].observed, Some(Observed::Counter(5)));
    assert_eq!(result.results[0].verdict, Verdict::Fail);
    assert!(result.any_failed);
}

#[test]
fn scenario_zero_discards_pass() {
    let result = evaluate(
        &doc(json!([{"name": "Gi0/2", "state": {"counters": {"in-discards": 0}}}])),
        &discards_check(),
    );
    assert_eq!(result.results[0].observed, Some(Observed::Counter(0)));
    assert_eq!(result.results[0].verdict, Verdict::Pass);
    assert!(!result.any_failed);
}

#[test]
fn scenario_absent_discards_not_applicable() {
    let result = evaluate(&doc(json!([{"name": "Gi0/3", "state": {}}])), &discards_check());
    assert_eq!(result.results[0].entity_name, "Gi0/3");
    assert_eq!(result.results[0].observed, None);
    assert_eq!(result.results[0].verdict, Verdict::NotApplicable);
    assert!(!result.any_failed);
}

#[test]
fn scenario_half_duplex_fails() {
    let check = CheckSpec::not_equal(
        "full-duplex",
        "Full duplex",
        "ethernet.state.negotiated-duplex-mode",
        "FULL",
    );
    let result = evaluate(
        &doc(json!([{"name": "Gi0/4", "ethernet": {"state": {"negotiated-duplex-mode": "HALF"}}}])),
        &check,
    );
    assert_eq!(result.results[0].verdict, Verdict::Fail);
    assert_eq!(result.results[0].observed, Some(Observed::Text("HALF".to_string())));
    assert!(result.any_failed);
}

#[test]
fn scenario_empty_document() {
    let result = evaluate(&doc(json!([])), &discards_check());
    assert!(result.results.is_empty());
    assert!(!result.any_failed);
}

#[test]
fn missing_field_does_not_stop_the_sweep() {
    let result = evaluate(
        &doc(json!([
            {"name": "Gi0/1"},
            {"name": "Gi0/2", "state": {"counters": {"in-discards": "oops"}}},
            {"name": "Gi0/3", "state": {"counters": {"in-discards": 9}}}
        ])),
        &discards_check(),
    );
    assert_eq!(result.results.len(), 3);
    assert_eq!(result.results[0].reason, Some(NaReason::MissingContainer));
    assert_eq!(result.results[1].reason, Some(NaReason::NotNumeric));
    assert_eq!(result.results[2].verdict, Verdict::Fail);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn prop_one_result_per_interface_in_order() {
    let mut rng = TestRng::new(42);
    for _ in 0..200 {
        let document = random_document(&mut rng);
        let result = evaluate(&document, &discards_check());

        assert_eq!(result.results.len(), document.len());
        let expected: Vec<&str> = document.names().collect();
        let actual: Vec<&str> = result.results.iter().map(|r| r.entity_name.as_str()).collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn prop_any_failed_iff_some_fail() {
    let mut rng = TestRng::new(7);
    for _ in 0..200 {
        let result = evaluate(&random_document(&mut rng), &discards_check());
        let has_fail = result.results.iter().any(|r| r.verdict == Verdict::Fail);
        assert_eq!(result.any_failed, has_fail);
        if result.results.iter().all(|r| r.verdict == Verdict::NotApplicable) {
            assert!(!result.any_failed, "N/A alone must never fail a check");
        }
    }
}

#[test]
fn prop_zero_passes_and_absent_is_not_applicable() {
    let mut rng = TestRng::new(1234);
    for _ in 0..200 {
        let document = random_document(&mut rng);
        let result = evaluate(&document, &discards_check());
        for (record, r) in document.records().iter().zip(&result.results) {
            let counter = record.data.pointer("/state/counters/in-discards");
            match counter {
                None => {
                    assert_eq!(r.verdict, Verdict::NotApplicable);
                    assert_eq!(r.observed, None);
                }
                Some(v) if v == &json!(0) || v == &json!("0") => {
                    assert_eq!(r.verdict, Verdict::Pass);
                }
                _ => {}
            }
        }
    }
}

#[test]
fn prop_evaluation_is_idempotent() {
    let mut rng = TestRng::new(99);
    for _ in 0..50 {
        let document = random_document(&mut rng);
        let before = document.clone();
        let first = evaluate(&document, &discards_check());
        let second = evaluate(&document, &discards_check());
        assert_eq!(first, second);
        assert_eq!(document, before);
    }
}
