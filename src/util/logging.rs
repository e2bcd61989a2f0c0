//! Structured logging setup.
//!
//! Discovery reports progress and soft failures through `tracing` events;
//! nothing in the library writes to stdout or stderr directly. The binary
//! installs a subscriber once at startup, either a console formatter or JSON
//! lines for log collectors.
//!
//! # Example
//!
//! ```no_run
//! use coherence_discovery::util::logging;
//! use coherence_discovery::DiscoveryConfig;
//!
//! // With environment: COHDISC_LOG_LEVEL=debug COHDISC_LOG_JSON=true
//! logging::init_logging(DiscoveryConfig::default().logging_config());
//!
//! tracing::info!(cluster = "myCluster", "Discovering cluster");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest"];

/// Target of events emitted by the `coherence-discover` binary itself.
const BINARY_TARGET: &str = "coherence_discover";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for events of this crate
    pub level: Level,

    /// Emit JSON lines instead of console output
    pub use_json: bool,

    /// Include the module target (e.g. `coherence_discovery::walker`)
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full event metadata, for unattended runs.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            ..Default::default()
        }
    }

    /// Filter directives used when `RUST_LOG` is not set.
    pub fn filter_directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        let mut directives = vec![
            format!("{}={}", env!("CARGO_CRATE_NAME"), level),
            format!("{}={}", BINARY_TARGET, level),
        ];
        directives.extend(QUIET_DEPENDENCIES.iter().map(|name| format!("{}=warn", name)));
        directives.join(",")
    }
}

/// Parses a log level (case-insensitive), falling back to `INFO`.
///
/// ```
/// use coherence_discovery::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(config.filter_directives())
                .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()))
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}
