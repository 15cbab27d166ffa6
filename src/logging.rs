//! Structured logging through `tracing`.
//!
//! Command results are printed on stdout, so log lines go to stderr unless
//! configured otherwise. The process environment can override the configured
//! values:
//!
//! - `BLOODLINK_LOG`: a complete `EnvFilter` directive, replacing level and modules
//! - `BLOODLINK_LOG_MODULES`: extra `target=level` pairs, comma separated
//! - `BLOODLINK_LOG_FORMAT`: `text` or `json`
//! - `BLOODLINK_LOG_OUTPUT`: `stdout`, `stderr` or `file`

use crate::error::ApiError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

const FILTER_ENV: &str = "BLOODLINK_LOG";
const MODULES_ENV: &str = "BLOODLINK_LOG_MODULES";
const FORMAT_ENV: &str = "BLOODLINK_LOG_FORMAT";
const OUTPUT_ENV: &str = "BLOODLINK_LOG_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(value.trim(), true)
            .map_err(|_| format!("Invalid log format: {} (expected text or json)", value))
    }
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(value.trim(), true).map_err(|_| {
            format!("Invalid log output: {} (expected stdout, stderr or file)", value)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `false` installs no subscriber at all
    pub enabled: bool,
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Only read when `output` is `file`
    pub file: PathBuf,
    /// ANSI colors for text logs on a terminal stream
    pub color: bool,
    /// Per-target levels, e.g. `bloodlink::provider = "trace"`
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            file: PathBuf::from("bloodlink.log"),
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid log level: {} (expected one of {})",
                self.level,
                LOG_LEVELS.join(", ")
            ));
        }
        for (target, level) in &self.modules {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(format!("Invalid log level for {}: {}", target, level));
            }
        }
        Ok(())
    }

    fn directives(&self) -> Vec<String> {
        let mut directives = vec![self.level.clone()];
        directives.extend(
            self.modules
                .iter()
                .map(|(target, level)| format!("{}={}", target, level)),
        );
        directives
    }
}

/// Install the global subscriber. A second call leaves the first subscriber
/// in place and returns `Ok`.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    if !config.enabled {
        return Ok(());
    }

    let filter = env_filter(config)?;
    let format = env_override(FORMAT_ENV)?.unwrap_or(config.format);
    let output = env_override(OUTPUT_ENV)?.unwrap_or(config.output);
    let ansi = config.color && output != LogOutput::File;
    let writer = make_writer(output, &config.file)?;

    let registry = Registry::default().with(filter);
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let installed = match format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry.with(layer.with_ansi(ansi)).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
    Ok(())
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(directive) = std::env::var(FILTER_ENV) {
        return EnvFilter::try_new(&directive).map_err(|e| {
            ApiError::ConfigError(format!("{}: invalid filter {:?}: {}", FILTER_ENV, directive, e))
        });
    }

    let mut directives = config.directives();
    if let Ok(extra) = std::env::var(MODULES_ENV) {
        directives.extend(
            extra
                .split(',')
                .filter_map(|pair| pair.split_once('='))
                .map(|(target, level)| format!("{}={}", target.trim(), level.trim())),
        );
    }

    EnvFilter::try_new(directives.join(","))
        .map_err(|e| ApiError::ConfigError(format!("Invalid log filter: {}", e)))
}

fn env_override<T: FromStr<Err = String>>(var: &str) -> Result<Option<T>, ApiError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ApiError::ConfigError(format!("{}: {}", var, e))),
        Err(_) => Ok(None),
    }
}

fn make_writer(output: LogOutput, file: &Path) -> Result<BoxMakeWriter, ApiError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => BoxMakeWriter::new(Mutex::new(open_log_file(file)?)),
    })
}

fn open_log_file(path: &Path) -> Result<std::fs::File, ApiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Cannot create log directory {}: {}", parent.display(), e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ApiError::ConfigError(format!("Cannot open log file {}: {}", path.display(), e)))
}
