use coherence_discovery::cli::commands::{CliArgs, Commands};
use coherence_discovery::cli::handlers::{handle_discover, resolve_config};
use coherence_discovery::util::logging::{init_logging, LoggingConfig};
use coherence_discovery::VERSION;

use clap::Parser;
use tracing::{debug, error};

fn main() {
    let args = CliArgs::parse();

    let exit_code = match &args.command {
        Commands::Discover(discover_args) => {
            match resolve_config(discover_args, args.log_level_override()) {
                Ok(config) => {
                    init_logging(config.logging_config());
                    debug!("coherence-discover v{} starting", VERSION);
                    debug!("Arguments: {:?}", args);
                    debug!("Configuration:\n{}", config);
                    handle_discover(discover_args, &config, args.quiet)
                }
                Err(e) => {
                    init_logging(LoggingConfig::default());
                    error!("Configuration error: {:#}", e);
                    eprintln!(
                        "\nPlease check your COHDISC_* environment variables and command-line arguments."
                    );
                    1
                }
            }
        }
    };

    std::process::exit(exit_code);
}
