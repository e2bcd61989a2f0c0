//! Rendering of the discovered model and the run summary.
//!
//! The model is written the way deployment tooling reads it: discovered
//! resources nested under a top-level `resources` section.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::RESOURCES;
use crate::model::{Model, ModelValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML, the usual model file format
    Yaml,
    /// JSON (machine-readable)
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unknown output format '{}'. Valid options: yaml, json", other),
        }
    }
}

/// What a discovery run produced, reported on stderr.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    pub root_key: String,
    pub clusters: usize,
    pub failures: usize,
    pub archive: PathBuf,
}

impl DiscoverySummary {
    pub fn new(root_key: &str, model: &Model, failures: usize, archive: PathBuf) -> Self {
        let clusters = model
            .get(root_key)
            .and_then(ModelValue::as_folder)
            .map(|clusters| clusters.len())
            .unwrap_or(0);

        Self {
            root_key: root_key.to_string(),
            clusters,
            failures,
            archive,
        }
    }
}

#[derive(Debug)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Renders `resources` wrapped in the top-level `resources` section.
    pub fn format_model(&self, resources: &Model) -> Result<String> {
        let mut document = Model::new();
        document.insert(RESOURCES.to_string(), ModelValue::Folder(resources.clone()));

        match self.format {
            OutputFormat::Yaml => {
                serde_yaml::to_string(&document).context("Failed to serialize model to YAML")
            }
            OutputFormat::Json => serde_json::to_string_pretty(&document)
                .map(|json| json + "\n")
                .context("Failed to serialize model to JSON"),
        }
    }

    pub fn format_summary(&self, summary: &DiscoverySummary) -> String {
        let mut output = format!(
            "Discovered {} {} into {}",
            summary.clusters,
            if summary.clusters == 1 { "cluster" } else { "clusters" },
            summary.root_key
        );
        output.push_str(&format!("\nArchive: {}", summary.archive.display()));
        if summary.failures > 0 {
            output.push_str(&format!(
                "\nWarning: {} artifact(s) could not be archived and were left out of the model",
                summary.failures
            ));
        }
        output
    }
}
