//! Bloodlink CLI Binary
//!
//! Command-line interface for the blood donation generative flows.

use bloodlink::cli::{command_name, map_error, Cli, RunContext};
use bloodlink::config::ConfigLoader;
use bloodlink::error::ApiError;
use bloodlink::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = build_logging_config(&cli).and_then(|config| init_logging(Some(&config))) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!(command = command_name(&cli.command), error = %e, "Command failed");
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, ApiError> {
    RunContext::new(cli.workspace.clone(), cli.config.clone())?.execute(&cli.command, cli.format)
}

/// Logging settings from the config layers, with command-line flags on top.
/// An unreadable config falls back to defaults here; `run` reports it.
fn build_logging_config(cli: &Cli) -> Result<LoggingConfig, ApiError> {
    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        config.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.format = format;
    }
    if let Some(output) = cli.log_output {
        config.output = output;
    }
    if let Some(file) = &cli.log_file {
        config.file = file.clone();
    }

    config.validate().map_err(ApiError::ConfigError)?;
    Ok(config)
}
