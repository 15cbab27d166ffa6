//! CLI parse: clap types for bloodlink. No behavior; definitions only.

use crate::flow::ALL_AVAILABLE_DONORS;
use crate::logging::{LogFormat, LogOutput};
use crate::types::Urgency;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bloodlink CLI - generative flows for blood donation coordination
#[derive(Parser)]
#[command(name = "bloodlink")]
#[command(about = "Request fulfillment, donor notifications and supply insights via a generation backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds config/)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(long, value_enum)]
    pub log_output: Option<LogOutput>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available flows
    Flows,
    /// Show the input and output schema of a flow
    Schema {
        /// Flow name (fulfillment, notification, insights)
        flow: String,
    },
    /// Render a flow's prompt from an input document without calling the backend
    Render {
        /// Flow name (fulfillment, notification, insights)
        flow: String,
        /// JSON input document, or "-" for stdin
        #[arg(long)]
        input: PathBuf,
    },
    /// Run a flow on an input document
    Run {
        /// Flow name (fulfillment, notification, insights)
        flow: String,
        /// JSON input document, or "-" for stdin
        #[arg(long)]
        input: PathBuf,
    },
    /// Match donors to a blood request
    Fulfill {
        /// Blood type needed (e.g. O+, AB-)
        #[arg(long)]
        blood_type: String,
        /// Units of blood required
        #[arg(long)]
        units: u32,
        /// Urgency (Low, Medium, High)
        #[arg(long)]
        urgency: Urgency,
        /// Donor availability criteria
        #[arg(long, default_value = ALL_AVAILABLE_DONORS)]
        donor_availability: String,
        /// Additional request details
        #[arg(long, default_value = "")]
        details: String,
    },
    /// Draft a notification message for a donor
    Notify {
        /// Blood type of the donor
        #[arg(long)]
        blood_type: String,
        /// Urgency (Low, Medium, High)
        #[arg(long)]
        urgency: Urgency,
        /// Units of blood required
        #[arg(long)]
        units: u32,
        /// Donor is not currently available
        #[arg(long)]
        unavailable: bool,
    },
    /// Analyze supply, demand and donor engagement
    Insights {
        /// Aggregated donor summary
        #[arg(long, default_value = "", conflicts_with = "stats")]
        donor_data: String,
        /// Aggregated request summary
        #[arg(long, default_value = "", conflicts_with = "stats")]
        request_data: String,
        /// Regional supply notes
        #[arg(long, default_value = "", conflicts_with = "stats")]
        regional_data: String,
        /// Platform statistics file (TOML or JSON) to summarise instead
        #[arg(long)]
        stats: Option<PathBuf>,
    },
}
