//! Deterministic report generation.
//!
//! All output is derived from evaluation results only: no timestamps, input
//! order preserved, so the same telemetry always renders the same report.

use crate::check::CheckSpec;
use crate::evaluate::{evaluate_catalog, AggregateResult, CheckResult, Verdict};
use crate::schema::YangModel;
use crate::telemetry::TelemetryDocument;
use serde::{Deserialize, Serialize};

/// Every check evaluated against one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<YangModel>,
    pub interface_count: usize,
    pub checks: Vec<AggregateResult>,
}

impl DeviceReport {
    pub fn build(device: &str, document: &TelemetryDocument, checks: &[CheckSpec]) -> Self {
        Self {
            device: device.to_string(),
            model: document.model,
            interface_count: document.len(),
            checks: evaluate_catalog(document, checks),
        }
    }

    pub fn any_failed(&self) -> bool {
        self.checks.iter().any(|c| c.any_failed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &AggregateResult> {
        self.checks.iter().filter(|c| c.any_failed)
    }
}

/// Plain table with one row per interface.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub verdict: Verdict,
}

impl Table {
    /// Render with `paint` applied to each padded status cell.
    ///
    /// Widths are measured before painting so escape codes never skew columns.
    pub fn render(&self, paint: &dyn Fn(Verdict, &str) -> String) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let rule = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format_line(&self.headers, &widths, None, paint));
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(&row.cells, &widths, Some(row.verdict), paint));
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

fn format_line(
    cells: &[String],
    widths: &[usize],
    verdict: Option<Verdict>,
    paint: &dyn Fn(Verdict, &str) -> String,
) -> String {
    let last = widths.len().saturating_sub(1);
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padded = format!(" {:<width$} ", cell, width = width);
        match verdict {
            Some(v) if i == last => line.push_str(&paint(v, &padded)),
            _ => line.push_str(&padded),
        }
        line.push('|');
    }
    line.push('\n');
    line
}

fn plain(_: Verdict, cell: &str) -> String {
    cell.to_string()
}

fn observed_cell(result: &CheckResult) -> String {
    match &result.observed {
        Some(observed) => observed.to_string(),
        None => "N/A".to_string(),
    }
}

/// Table for one check on one device: Device | Interface | value | Passed/Failed.
pub fn check_table(device: &str, result: &AggregateResult) -> Table {
    Table {
        title: result.check_label.clone(),
        headers: vec![
            "Device".to_string(),
            "Interface".to_string(),
            result.check_label.clone(),
            "Passed/Failed".to_string(),
        ],
        rows: result
            .results
            .iter()
            .map(|r| TableRow {
                cells: vec![
                    device.to_string(),
                    r.entity_name.clone(),
                    observed_cell(r),
                    r.verdict.to_string(),
                ],
                verdict: r.verdict,
            })
            .collect(),
    }
}

/// One check as plain text, followed by its verdict message.
pub fn format_text(device: &str, result: &AggregateResult) -> String {
    format_text_with(device, result, &plain)
}

pub fn format_text_with(
    device: &str,
    result: &AggregateResult,
    paint: &dyn Fn(Verdict, &str) -> String,
) -> String {
    let mut out = check_table(device, result).render(paint);
    let tag = if result.any_failed { "FAILED" } else { "PASSED" };
    out.push_str(&format!("[{}] {}\n", tag, result.message));
    out
}

/// Whole device as plain text.
pub fn format_device_text(report: &DeviceReport, paint: &dyn Fn(Verdict, &str) -> String) -> String {
    let mut out = String::new();
    let model = report
        .model
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unknown model".to_string());
    out.push_str(&format!(
        "DEVICE {} ({}, {} interface{})\n\n",
        report.device,
        model,
        report.interface_count,
        if report.interface_count == 1 { "" } else { "s" }
    ));
    for result in &report.checks {
        out.push_str(&format_text_with(&report.device, result, paint));
        out.push('\n');
    }
    out
}

/// Table cell text with `|` escaped so it cannot open a new column.
fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Whole device as markdown, one table per check.
pub fn format_markdown(report: &DeviceReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", report.device));
    if let Some(model) = report.model {
        out.push_str(&format!("Model: `{}`\n\n", model));
    }

    for result in &report.checks {
        out.push_str(&format!("## {}\n\n", result.check_label));
        if result.results.is_empty() {
            out.push_str("_No interfaces reported._\n\n");
            continue;
        }
        out.push_str(&format!(
            "| Interface | {} | Status | Note |\n",
            markdown_cell(&result.check_label)
        ));
        out.push_str("|-----------|------|--------|------|\n");
        for r in &result.results {
            let note = r.reason.map(|reason| reason.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "| {} | {} | **{}** | {} |\n",
                markdown_cell(&r.entity_name),
                markdown_cell(&observed_cell(r)),
                r.verdict,
                note
            ));
        }
        out.push_str(&format!("\n{}\n\n", result.message));
    }
    out
}

/// Totals across devices, e.g. "2 devices, 30 checks: 3 failed, 27 passed".
pub fn summary_line(reports: &[DeviceReport]) -> String {
    let total: usize = reports.iter().map(|r| r.checks.len()).sum();
    let failed: usize = reports.iter().map(|r| r.failed_checks().count()).sum();
    format!(
        "{} device{}, {} check{}: {} failed, {} passed",
        reports.len(),
        if reports.len() == 1 { "" } else { "s" },
        total,
        if total == 1 { "" } else { "s" },
        failed,
        total - failed
    )
}

/// Compact list of failing interfaces, or `None` when everything passed.
///
/// This is the text a chat notifier would post.
pub fn failure_summary(reports: &[DeviceReport]) -> Option<String> {
    let mut lines = Vec::new();
    for report in reports {
        for result in report.failed_checks() {
            let entries: Vec<String> = result
                .failed()
                .map(|r| match &r.observed {
                    Some(observed) => format!("{} ({})", r.entity_name, observed),
                    None => r.entity_name.clone(),
                })
                .collect();
            lines.push(format!(
                "{} - {}: {}",
                report.device,
                result.message,
                entries.join(", ")
            ));
        }
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}
