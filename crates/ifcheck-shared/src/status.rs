//! Admin/oper status mapping per YANG model.
//!
//! A port is healthy when its oper status is one of the states its admin
//! status should produce. OpenConfig and IETF use the same vocabulary on both
//! leaves; Cisco-native uses distinct enumerations for admin and oper.

use crate::schema::YangModel;

/// Oper states acceptable for `admin` under `model`, or `None` when the admin
/// value is not one the model defines.
pub fn expected_oper(model: YangModel, admin: &str) -> Option<&'static [&'static str]> {
    let expected: &'static [&'static str] = match (model, admin) {
        (YangModel::OpenConfig, "UP") => &["UP"],
        (YangModel::OpenConfig, "DOWN") => &["DOWN"],
        (YangModel::OpenConfig, "TESTING") => &["TESTING"],

        (YangModel::Ietf, "up") => &["up"],
        (YangModel::Ietf, "down") => &["down"],
        (YangModel::Ietf, "testing") => &["testing"],

        (YangModel::CiscoNative, "if-state-up") => &["if-oper-state-ready"],
        (YangModel::CiscoNative, "if-state-down") => {
            &["if-oper-state-no-pass", "if-oper-state-lower-layer-down"]
        }
        (YangModel::CiscoNative, "if-state-test") => &["if-oper-state-test"],

        _ => return None,
    };
    Some(expected)
}

/// Whether `oper` matches what `admin` implies. `None` for unmapped admin values.
pub fn status_matches(model: YangModel, admin: &str, oper: &str) -> Option<bool> {
    expected_oper(model, admin).map(|states| states.contains(&oper))
}
