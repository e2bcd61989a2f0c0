use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Discovers Coherence cluster resources and externalizes their artifacts
#[derive(Parser, Debug)]
#[command(
    name = "coherence-discover",
    about = "Discover Coherence cluster resources into a portable model and archive",
    version,
    author,
    long_about = "coherence-discover walks the Coherence cluster resources of a domain \
                  snapshot, writes the discovered model and copies referenced cache \
                  configurations, custom cluster configurations and persistence \
                  directories into an archive."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Log level requested on the command line. `--log-level` wins over
    /// `-v`/`-q`; `None` leaves the choice to the configuration.
    pub fn log_level_override(&self) -> Option<&str> {
        if let Some(level) = self.log_level.as_deref() {
            Some(level)
        } else if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Discover Coherence resources from a domain snapshot",
        long_about = "Reads a YAML or JSON snapshot of the domain's resource tree, discovers \
                      every CoherenceClusterSystemResource and writes the model under a \
                      'resources' section. Artifacts are stored in a tar archive, gzipped \
                      when the archive name ends in .gz or .tgz.\n\n\
                      Examples:\n  \
                      coherence-discover discover --snapshot domain.yaml --archive archive.tar.gz\n  \
                      coherence-discover discover -s domain.json -a archive.tar -o model.json --format json"
    )]
    Discover(DiscoverArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DiscoverArgs {
    #[arg(
        short = 's',
        long,
        value_name = "FILE",
        help = "Snapshot of the domain resource tree (.yaml, .yml or .json)"
    )]
    pub snapshot: PathBuf,

    #[arg(
        short = 'a',
        long,
        value_name = "FILE",
        help = "Archive to write artifacts to (defaults to COHDISC_ARCHIVE)"
    )]
    pub archive: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the model to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        help = "Model format (defaults to COHDISC_OUTPUT_FORMAT, then yaml)"
    )]
    pub format: Option<OutputFormatArg>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Timeout for fetching http cache configurations"
    )]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Yaml,
    Json,
}

impl OutputFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormatArg::Yaml => "yaml",
            OutputFormatArg::Json => "json",
        }
    }
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
        }
    }
}
