//! Archive writer seam and the entry naming shared by all writers.
//!
//! Every Coherence artifact lives under `wlsdeploy/coherence/<cluster>/`.
//! Names depend only on the cluster and the artifact, never on timing, so
//! repeated runs against the same tree produce the same model.

mod ledger;
mod memory;
mod tarball;

pub use self::ledger::{Claim, EntryLedger};
pub use self::memory::{ArchiveEntry, ArchiveOperation, InMemoryArchive};
pub use self::tarball::TarArchiveWriter;

use crate::constants::ARCHIVE_COHERENCE_TARGET_DIR;
use crate::error::ArchiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

/// Kind of Coherence persistence directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceKind {
    Active,
    Snapshot,
    Trash,
}

impl PersistenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistenceKind::Active => "active",
            PersistenceKind::Snapshot => "snapshot",
            PersistenceKind::Trash => "trash",
        }
    }
}

impl fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write side of the portable archive. Calls are issued sequentially by a
/// single discovery run; implementations shared between runs must serialize
/// access themselves.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveWriter {
    /// Stores a local configuration file for `cluster`, returning its entry name.
    fn add_config_file(&mut self, cluster: &str, file: &Path) -> Result<String, ArchiveError>;

    /// Fetches `url` and stores the body for `cluster`, returning its entry name.
    fn add_config_file_from_url(&mut self, cluster: &str, url: &Url) -> Result<String, ArchiveError>;

    /// Allocates an (empty) persistence directory of `kind` for `cluster`.
    fn add_persistence_directory(
        &mut self,
        cluster: &str,
        kind: PersistenceKind,
    ) -> Result<String, ArchiveError>;
}

pub fn validate_cluster_name(cluster: &str) -> Result<(), ArchiveError> {
    if cluster.trim().is_empty() {
        return Err(ArchiveError::InvalidArgument(
            "cluster name must not be empty".to_string(),
        ));
    }
    if cluster.contains(['/', '\\']) || cluster == "." || cluster == ".." {
        return Err(ArchiveError::InvalidArgument(format!(
            "cluster name '{}' cannot be used as an archive directory",
            cluster
        )));
    }
    Ok(())
}

pub fn config_file_entry_name(cluster: &str, file_name: &str) -> String {
    format!("{}/{}/{}", ARCHIVE_COHERENCE_TARGET_DIR, cluster, file_name)
}

pub fn persistence_entry_name(cluster: &str, kind: PersistenceKind) -> String {
    format!("{}/{}/{}/", ARCHIVE_COHERENCE_TARGET_DIR, cluster, kind)
}

pub fn file_name_of(file: &Path) -> Result<String, ArchiveError> {
    file.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ArchiveError::InvalidArgument(format!("'{}' does not name a file", file.display()))
        })
}

/// Last non-empty path segment of `url`.
pub fn url_file_name(url: &Url) -> Result<String, ArchiveError> {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| ArchiveError::InvalidArgument(format!("URL '{}' does not name a file", url)))
}
