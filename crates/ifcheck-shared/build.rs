//! Stamps build provenance into `version.rs`.
//!
//! IFCHECK_GIT_SHA comes from `git describe`, IFCHECK_BUILD_DATE from
//! SOURCE_DATE_EPOCH when packagers set it, else the current UTC date.

use chrono::{DateTime, Utc};
use std::process::Command;

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string()).filter(|s| !s.is_empty())
}

fn build_date() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    pinned.unwrap_or_else(Utc::now).format("%Y-%m-%d").to_string()
}

fn main() {
    let sha = describe().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=IFCHECK_GIT_SHA={}", sha);
    println!("cargo:rustc-env=IFCHECK_BUILD_DATE={}", build_date());

    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
