//! ifcheckctl - interface health checks over saved RESTCONF responses
//!
//! Evaluates the built-in check catalog for each device file and prints
//! per-check tables. Exits non-zero when any check failed.

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::OutputFormat;
use ifcheck_shared::{IfcheckError, YangModel};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ifcheckctl")]
#[command(about = "Interface health checks for RESTCONF telemetry", long_about = None)]
#[command(version = ifcheck_shared::version::VERSION)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ~/.config/ifcheck/config.toml, then /etc/ifcheck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate saved RESTCONF interface responses
    Check {
        /// Response bodies, e.g. dist1_OpenConfig_Interfaces.json
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// YANG model of the files
        #[arg(long, value_enum, default_value_t = ModelArg::Auto)]
        model: ModelArg,

        /// Device name (single file only; default: file name up to the first '_')
        #[arg(long)]
        device: Option<String>,

        /// Run only these check ids
        #[arg(long = "only", value_name = "ID")]
        only: Vec<String>,

        /// Report format (default from config, else text)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Also write all device reports as JSON
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// List the checks for a model
    Checks {
        #[arg(long, value_enum, default_value_t = ModelArg::Auto)]
        model: ModelArg,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Auto,
    Openconfig,
    CiscoNative,
    Ietf,
}

impl ModelArg {
    fn model(self) -> Option<YangModel> {
        match self {
            ModelArg::Auto => None,
            ModelArg::Openconfig => Some(YangModel::OpenConfig),
            ModelArg::CiscoNative => Some(YangModel::CiscoNative),
            ModelArg::Ietf => Some(YangModel::Ietf),
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit status for an error: the library's code when one is in the chain.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<IfcheckError>())
        .map(|e| e.exit_code())
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(2)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, source) = config::IfcheckConfig::load(cli.config.as_deref())?;
    debug!(
        version = %ifcheck_shared::version::long_version(),
        config = ?source,
        "ifcheckctl starting"
    );

    match cli.command {
        Commands::Check {
            files,
            model,
            device,
            only,
            format,
            export,
        } => commands::check(
            &config,
            commands::CheckArgs {
                files,
                model: model.model(),
                device,
                only,
                format: format.unwrap_or(config.output.format),
                export,
            },
        ),
        Commands::Checks { model, json } => commands::checks(&config, model.model(), json),
        Commands::Config => commands::config(&config, source.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_code_follows_library_error() {
        let err = anyhow::Error::from(IfcheckError::Schema("x".to_string()))
            .context("Failed to load r1.json");
        assert_eq!(exit_code(&err), 3);

        let err: anyhow::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
                .map_err(IfcheckError::from)
                .context("Failed to load r1.json");
        assert_eq!(exit_code(&err.unwrap_err()), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("usage")), 2);
    }

    #[test]
    fn test_model_arg_names() {
        let cli = Cli::try_parse_from(["ifcheckctl", "checks", "--model", "cisco-native"]).unwrap();
        match cli.command {
            Commands::Checks { model, .. } => assert_eq!(model.model(), Some(YangModel::CiscoNative)),
            _ => panic!("expected checks"),
        }
        assert!(Cli::try_parse_from(["ifcheckctl", "check"]).is_err());
    }
}
