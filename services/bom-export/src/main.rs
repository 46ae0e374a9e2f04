//! KiCad BOM Export
//!
//! Converts a KiCad intermediate netlist into CSV and XML bills of
//! materials, optionally grouping like components and pricing them through
//! the FindChips API.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod export;
mod findchips;
mod pricing;

use export::{run_export, ExportOptions};
use kicad_bom_utils::{
    default_output_base, init_logging, validate_config, validate_input_file,
    validate_pricing_credentials, AppConfig, BomError, BomResult, PricingService,
};

/// Export a KiCad netlist to CSV and XML formats
#[derive(Debug, Parser)]
#[command(name = "kicad-bom-export", version, about)]
struct Cli {
    /// Path and filename of the netlist (KiCad intermediate XML)
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output path and filename, without extension, for the XML and CSV files
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Group duplicate parts into a single entry
    #[arg(short = 'g', long = "group")]
    group: bool,

    /// Use the FindChips online pricing engine
    #[arg(short = 'f', long = "findchips")]
    findchips: bool,

    /// API key for the online pricing engine
    #[arg(short = 'a', long = "apikey", env = "FINDCHIPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Split "Library:Footprint" into FootprintLib and Footprint columns
    #[arg(long = "split-footprint-lib")]
    split_footprint_lib: bool,

    /// Additional configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the log here instead of the home directory
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long = "log-stderr")]
    log_stderr: bool,
}

impl Cli {
    /// Command line flags take precedence over configuration
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if self.group {
            config.grouping.enabled = true;
        }
        if self.split_footprint_lib {
            config.grouping.split_footprint_library = true;
        }
        if self.findchips {
            config.pricing.service = Some(PricingService::FindChips);
        }
        if let Some(key) = &self.api_key {
            config.pricing.api_key = Some(key.clone());
        }
        if let Some(path) = &self.log_file {
            config.logging.file_path = Some(path.display().to_string());
        }
        if self.log_stderr {
            config.logging.to_stderr = true;
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => cli.apply(config),
        Err(e) => return fail(&BomError::from(e)),
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Could not initialise logging: {:#}", e);
        return ExitCode::from(1);
    }
    info!("Script Started");
    info!(
        input = ?cli.input,
        output = ?cli.output,
        group = cli.group,
        findchips = cli.findchips,
        api_key_given = cli.api_key.is_some(),
        "Command Line Arguments"
    );

    let result = match prepare(&cli, config) {
        Ok(options) => run_export(&options).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            info!(
                "Export finished: {} components, {} rows",
                report.components, report.rows
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Validates parameters and resolves the export options
fn prepare(cli: &Cli, config: AppConfig) -> BomResult<ExportOptions> {
    validate_config(&config)?;
    let input = validate_input_file(cli.input.as_deref())?.to_path_buf();
    validate_pricing_credentials(config.pricing.service, config.pricing.api_key.as_deref())?;

    let output_base = match &cli.output {
        Some(output) => output.clone(),
        None => {
            let base = default_output_base(&input);
            info!("No OUTPUT Filename specified - using: {}", base.display());
            base
        }
    };

    Ok(ExportOptions {
        input,
        output_base,
        grouping: config.grouping,
        pricing: config.pricing,
    })
}

fn fail(e: &BomError) -> ExitCode {
    ExitCode::from(report_failure(e))
}

/// Logs and prints `e`, with usage text for configuration errors.
/// Returns the process exit status.
fn report_failure(e: &BomError) -> u8 {
    error!(code = e.error_code(), "{}", e);
    if e.exit_code() == 2 {
        let _ = Cli::command().print_help();
    }
    eprintln!("\n***ERROR*** {}", e);
    e.exit_code() as u8
}
