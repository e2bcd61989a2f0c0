//! Utility modules.

pub mod logging;

pub use logging::{init_default, init_logging, parse_level, LoggingConfig};
