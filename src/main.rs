//! SESP MCDM command-line entry point.
//!
//! # Commands
//!
//! - `ahp`: Incentive criteria weights and consistency
//! - `topsis`: Pricing scenario ranking and weight sensitivity
//! - `dea`: Subscription plan efficiency and diagnosis
//! - `all`: All three, with the AHP weights feeding the TOPSIS
//! - `run <file>`: Solve an AHP, TOPSIS or DEA problem file
//!
//! Reports go to stdout; logs go to stderr.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sesp_mcdm::application::{
    BuiltinAnalysis, RunAnalysisCommand, RunAnalysisHandler, RunProblemCommand, RunProblemHandler,
};
use sesp_mcdm::config::{AppConfig, LoggingConfig};

/// SESP MCDM - AHP, TOPSIS and DEA for subscription pricing
#[derive(Parser)]
#[command(name = "sesp-mcdm")]
#[command(version)]
#[command(about = "Multi-criteria decision analysis for subscription appliance pricing")]
struct Cli {
    /// Configuration file (YAML, JSON or TOML); environment variables still override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text reports
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Incentive criteria weights (AHP)
    Ahp,
    /// Pricing scenario ranking (TOPSIS)
    Topsis,
    /// Subscription plan efficiency (DEA)
    Dea,
    /// Run all three analyses
    All,
    /// Solve a problem file
    Run {
        /// Path to a `.yaml`, `.yml` or `.json` problem file
        path: PathBuf,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn emit<T: Serialize>(json: bool, value: &T, report: &str) {
    if !json {
        println!("{report}");
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!("Failed to serialize result: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(2);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}");
        process::exit(2);
    }

    init_tracing(&config.logging);
    tracing::debug!(
        ahp_variation = config.analysis.ahp_variation,
        topsis_variation = config.analysis.topsis_variation,
        dea_orientation = %config.analysis.dea_orientation,
        "Configuration loaded"
    );

    let analysis = match cli.command {
        Commands::Ahp => BuiltinAnalysis::Ahp,
        Commands::Topsis => BuiltinAnalysis::Topsis,
        Commands::Dea => BuiltinAnalysis::Dea,
        Commands::All => BuiltinAnalysis::All,
        Commands::Run { path } => {
            let handler = RunProblemHandler::new(config.analysis);
            match handler.handle(RunProblemCommand { path }) {
                Ok(result) => emit(cli.json, &result, &result.report),
                Err(e) => {
                    tracing::error!(code = %e.code(), "{e}");
                    process::exit(1);
                }
            }
            return;
        }
    };

    let handler = RunAnalysisHandler::new(config.analysis);
    match handler.handle(RunAnalysisCommand { analysis }) {
        Ok(result) => emit(cli.json, &result, &result.report),
        Err(e) => {
            tracing::error!(code = %e.code(), "{e}");
            process::exit(1);
        }
    }
}
