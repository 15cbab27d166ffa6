//! CLI domain: parse, route, help, output, and presentation only.
//! No flow logic; a single route table dispatches to the flow adapters.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, requires_backend};
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_flow_list, format_flow_result, format_prompt, format_schemas};
pub use route::{load_platform_stats, read_input_document, RunContext};
