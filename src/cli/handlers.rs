use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

use super::commands::DiscoverArgs;
use super::output::{DiscoverySummary, OutputFormat, OutputFormatter};
use crate::archive::TarArchiveWriter;
use crate::config::DiscoveryConfig;
use crate::discoverer::CoherenceResourcesDiscoverer;
use crate::fs::{FileSystem, RealFileSystem};
use crate::provider::SnapshotProvider;

/// Runs the `discover` command and returns the process exit code.
///
/// Artifacts that could not be archived do not fail the command; they are
/// reported in the summary.
pub fn handle_discover(args: &DiscoverArgs, config: &DiscoveryConfig, quiet: bool) -> i32 {
    let fs = RealFileSystem::new();
    match run_discover(args, config, &fs) {
        Ok((summary, formatter)) => {
            if !quiet {
                eprintln!("{}", formatter.format_summary(&summary));
            }
            0
        }
        Err(e) => {
            error!("Discovery failed: {:#}", e);
            1
        }
    }
}

/// Environment configuration with command line flags applied on top.
///
/// `log_level` is the level requested on the command line, if any.
pub fn resolve_config(args: &DiscoverArgs, log_level: Option<&str>) -> Result<DiscoveryConfig> {
    let mut config = DiscoveryConfig::default();
    if let Some(level) = log_level {
        config.log_level = level.to_lowercase();
    }
    if let Some(timeout) = args.timeout {
        config.http_timeout_secs = timeout;
    }
    if let Some(archive) = &args.archive {
        config.archive = Some(archive.clone());
    }
    if let Some(format) = args.format {
        config.output_format = format.as_str().to_string();
    }
    config.validate()?;
    Ok(config)
}

pub fn run_discover(
    args: &DiscoverArgs,
    config: &DiscoveryConfig,
    fs: &dyn FileSystem,
) -> Result<(DiscoverySummary, OutputFormatter)> {
    let archive_path: PathBuf = config
        .archive
        .clone()
        .context("No archive given. Pass --archive or set COHDISC_ARCHIVE")?;
    let format: OutputFormat = config.output_format.parse()?;

    info!("Loading snapshot: {}", args.snapshot.display());
    let provider = SnapshotProvider::load(fs, &args.snapshot)?;

    let mut archive = TarArchiveWriter::create(&archive_path, config.http_timeout())
        .with_context(|| format!("Failed to create archive {}", archive_path.display()))?;

    let (root_key, model, failures) = {
        let mut discoverer = CoherenceResourcesDiscoverer::new(&provider, &mut archive, fs);
        let (root_key, model) = discoverer.discover()?;
        (root_key, model, discoverer.failure_count())
    };
    let archive_path = archive.finish()?;

    let formatter = OutputFormatter::new(format);
    let rendered = formatter.format_model(&model)?;
    match &args.output {
        Some(output_file) => {
            std::fs::write(output_file, &rendered)
                .with_context(|| format!("Failed to write model to {}", output_file.display()))?;
            info!("Model written to: {}", output_file.display());
        }
        None => print!("{}", rendered),
    }

    let summary = DiscoverySummary::new(&root_key, &model, failures, archive_path);
    Ok((summary, formatter))
}
