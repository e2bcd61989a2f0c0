pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DiscoverArgs, OutputFormatArg};
pub use handlers::handle_discover;
pub use output::{DiscoverySummary, OutputFormat, OutputFormatter};
