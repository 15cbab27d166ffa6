//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log records (e.g. "fulfill", "run").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Flows => "flows",
        Commands::Schema { .. } => "schema",
        Commands::Render { .. } => "render",
        Commands::Run { .. } => "run",
        Commands::Fulfill { .. } => "fulfill",
        Commands::Notify { .. } => "notify",
        Commands::Insights { .. } => "insights",
    }
}

/// Whether the command calls the generation backend.
pub fn requires_backend(command: &Commands) -> bool {
    !matches!(
        command,
        Commands::Flows | Commands::Schema { .. } | Commands::Render { .. }
    )
}
