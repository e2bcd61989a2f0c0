use super::{
    config_file_entry_name, file_name_of, persistence_entry_name, url_file_name,
    validate_cluster_name, ArchiveWriter, Claim, EntryLedger, PersistenceKind,
};
use crate::error::ArchiveError;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    File { name: String, source: PathBuf },
    Url { name: String, url: String },
    Directory { name: String, kind: PersistenceKind },
}

impl ArchiveEntry {
    pub fn name(&self) -> &str {
        match self {
            ArchiveEntry::File { name, .. }
            | ArchiveEntry::Url { name, .. }
            | ArchiveEntry::Directory { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveOperation {
    ConfigFile,
    ConfigFileFromUrl,
    PersistenceDirectory,
}

/// Archive that records entries instead of writing them. Used for dry runs
/// and to inject archive failures.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    ledger: EntryLedger,
    entries: Vec<ArchiveEntry>,
    failing_clusters: HashSet<String>,
    failing_operations: HashSet<ArchiveOperation>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write for `cluster` fails with an I/O error.
    pub fn fail_cluster(mut self, cluster: &str) -> Self {
        self.failing_clusters.insert(cluster.to_string());
        self
    }

    /// Every write of `operation` fails with an I/O error.
    pub fn fail_operation(mut self, operation: ArchiveOperation) -> Self {
        self.failing_operations.insert(operation);
        self
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(ArchiveEntry::name).collect()
    }

    fn check_injected(&self, cluster: &str, operation: ArchiveOperation, name: &str) -> Result<(), ArchiveError> {
        if self.failing_clusters.contains(cluster) || self.failing_operations.contains(&operation) {
            return Err(ArchiveError::Io {
                path: name.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "injected archive failure"),
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        cluster: &str,
        operation: ArchiveOperation,
        source: &str,
        entry: ArchiveEntry,
    ) -> Result<String, ArchiveError> {
        let name = entry.name().to_string();
        self.check_injected(cluster, operation, &name)?;
        if self.ledger.claim(&name, source)? == Claim::New {
            self.entries.push(entry);
        }
        Ok(name)
    }
}

impl ArchiveWriter for InMemoryArchive {
    fn add_config_file(&mut self, cluster: &str, file: &Path) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        let name = config_file_entry_name(cluster, &file_name_of(file)?);
        let source = file.to_string_lossy().to_string();
        self.record(
            cluster,
            ArchiveOperation::ConfigFile,
            &source,
            ArchiveEntry::File {
                name,
                source: file.to_path_buf(),
            },
        )
    }

    fn add_config_file_from_url(&mut self, cluster: &str, url: &Url) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        let name = config_file_entry_name(cluster, &url_file_name(url)?);
        self.record(
            cluster,
            ArchiveOperation::ConfigFileFromUrl,
            url.as_str(),
            ArchiveEntry::Url {
                name,
                url: url.to_string(),
            },
        )
    }

    fn add_persistence_directory(
        &mut self,
        cluster: &str,
        kind: PersistenceKind,
    ) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        let name = persistence_entry_name(cluster, kind);
        self.record(
            cluster,
            ArchiveOperation::PersistenceDirectory,
            kind.as_str(),
            ArchiveEntry::Directory { name, kind },
        )
    }
}
