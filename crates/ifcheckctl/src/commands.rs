//! Command implementations for ifcheckctl

use crate::config::{IfcheckConfig, OutputFormat};
use anyhow::{Context, Result};
use ifcheck_shared::policy::{catalog_with, known_ids};
use ifcheck_shared::report::{
    failure_summary, format_device_text, format_markdown, summary_line, DeviceReport,
};
use ifcheck_shared::{CheckSpec, IfcheckError, TelemetryDocument, Verdict, YangModel};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};

pub struct CheckArgs {
    pub files: Vec<PathBuf>,
    pub model: Option<YangModel>,
    pub device: Option<String>,
    pub only: Vec<String>,
    pub format: OutputFormat,
    pub export: Option<PathBuf>,
}

/// Device alias from a saved response name: `dist1_OpenConfig_Interfaces.json` -> `dist1`
pub fn device_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.split('_').next() {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => stem,
    }
}

fn painter(enabled: bool) -> impl Fn(Verdict, &str) -> String {
    move |verdict: Verdict, cell: &str| {
        if !enabled {
            return cell.to_string();
        }
        match verdict {
            Verdict::Pass => cell.green().to_string(),
            Verdict::Fail => cell.red().bold().to_string(),
            Verdict::NotApplicable => cell.dimmed().to_string(),
        }
    }
}

/// Reject --only ids that no catalog or custom check defines.
fn validate_only(config: &IfcheckConfig, only: &[String]) -> Result<()> {
    let known = known_ids();
    for id in only {
        let custom = config.policy.checks.iter().any(|c| &c.id == id);
        if !known.contains(&id.as_str()) && !custom {
            return Err(IfcheckError::Config(format!("unknown check id '{}'", id)).into());
        }
    }
    Ok(())
}

fn checks_for(config: &IfcheckConfig, model: YangModel, only: &[String]) -> Result<Vec<CheckSpec>> {
    let mut checks = catalog_with(model, &config.policy)
        .with_context(|| format!("Invalid policy for {}", model))?;
    if !only.is_empty() {
        checks.retain(|c| only.iter().any(|id| id == c.id()));
    }
    Ok(checks)
}

fn evaluate_file(
    config: &IfcheckConfig,
    path: &Path,
    args: &CheckArgs,
) -> Result<DeviceReport> {
    let document = TelemetryDocument::load(path, args.model)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let model = document.model.ok_or_else(|| {
        IfcheckError::Schema(format!("{}: YANG model unknown", path.display()))
    })?;
    let device = args.device.clone().unwrap_or_else(|| device_name(path));

    let checks = checks_for(config, model, &args.only)?;
    let report = DeviceReport::build(&device, &document, &checks);

    if document.is_empty() {
        warn!(device = %device, "no interfaces in response, every check passes vacuously");
    } else {
        for result in report.checks.iter().filter(|c| c.is_vacuous()) {
            warn!(
                device = %device,
                check = %result.check_id,
                "no interface reported this field"
            );
        }
    }
    info!(
        device = %device,
        model = %model,
        interfaces = report.interface_count,
        failed = report.failed_checks().count(),
        "evaluated device"
    );
    Ok(report)
}

/// Evaluate every file and print the reports. Exit 1 when any check failed.
pub fn check(config: &IfcheckConfig, args: CheckArgs) -> Result<ExitCode> {
    if args.device.is_some() && args.files.len() > 1 {
        return Err(IfcheckError::Config("--device needs exactly one file".to_string()).into());
    }
    validate_only(config, &args.only)?;

    let reports = args
        .files
        .iter()
        .map(|path| evaluate_file(config, path, &args))
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        OutputFormat::Text => {
            let paint = painter(config.output.color.enabled());
            for report in &reports {
                print!("{}", format_device_text(report, &paint));
            }
            println!("{}", summary_line(&reports));
            if let Some(summary) = failure_summary(&reports) {
                println!();
                println!("{}", summary);
            }
        }
        OutputFormat::Markdown => {
            for report in &reports {
                print!("{}", format_markdown(report));
            }
            println!("{}", summary_line(&reports));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports).context("Failed to serialize reports")?;
            println!("{}", json);
        }
    }

    if let Some(path) = &args.export {
        let json = serde_json::to_string_pretty(&reports).context("Failed to serialize reports")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "exported reports");
    }

    let failed = reports.iter().any(|r| r.any_failed());
    Ok(if failed { ExitCode::from(1) } else { ExitCode::SUCCESS })
}

/// List the effective catalog, for one model or all of them.
pub fn checks(config: &IfcheckConfig, model: Option<YangModel>, json: bool) -> Result<ExitCode> {
    let models: Vec<YangModel> = match model {
        Some(model) => vec![model],
        None => YangModel::ALL.to_vec(),
    };

    if json {
        let mut out = serde_json::Map::new();
        for model in &models {
            let checks = checks_for(config, *model, &[])?;
            out.insert(model.to_string(), serde_json::to_value(&checks)?);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(ExitCode::SUCCESS);
    }

    for (i, model) in models.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({})", model, model.restconf_path());
        for check in checks_for(config, *model, &[])? {
            println!(
                "  {:<22} {:<26} {}  {}",
                check.id(),
                check.label(),
                check.path(),
                check.comparison()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the effective configuration as TOML.
pub fn config(config: &IfcheckConfig, source: Option<&Path>) -> Result<ExitCode> {
    match source {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# no config file found, showing defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(ExitCode::SUCCESS)
}
