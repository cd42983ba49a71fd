//! Strata CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Variable error
//! - 4: Configuration error (contradictory inputs)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strata_blueprints::BlueprintError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VARIABLE_ERROR: u8 = 3;
    pub const CONFIGURATION_ERROR: u8 = 4;
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "strata=debug,warn"
    } else if cli.quiet {
        "warn"
    } else {
        "strata=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so rendered templates on stdout stay clean.
    let log_result = if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::List => commands::list::execute(),
        Commands::Describe(args) => commands::describe::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Map an error onto an exit code by the blueprint error it wraps.
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.chain().find_map(|cause| cause.downcast_ref::<BlueprintError>()) {
        Some(err) if err.is_configuration_error() => ExitCodes::CONFIGURATION_ERROR,
        Some(BlueprintError::Variables(_)) => ExitCodes::VARIABLE_ERROR,
        Some(
            BlueprintError::UnknownBlueprint(_)
            | BlueprintError::StackNotFound(_)
            | BlueprintError::MissingEnvironmentValue(_),
        ) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
