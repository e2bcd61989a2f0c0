//! Relocation of externally referenced Coherence artifacts into the archive.
//!
//! Every operation returns `Result<String, RelocationError>`. Callers decide
//! how a failure shows up in the model; the attribute handlers log it and drop
//! the attribute so discovery of the remaining tree is unaffected.

use crate::archive::{ArchiveWriter, PersistenceKind};
use crate::constants::codes;
use crate::error::{ArchiveError, ClassificationError, RelocationError};
use crate::fs::FileSystem;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Where a configuration reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// An `http` URL, fetched by the archive writer.
    Remote(Url),
    /// Anything else, including URLs of other schemes, is a local path.
    Local,
}

const ILLEGAL_CHARACTERS: &[char] = &['"', '<', '>', '\\', '^', '`', '{', '|', '}'];

/// Classifies `reference` the way a generic URI parser would.
///
/// A reference that is not a syntactically valid URI fails classification;
/// callers fall back to treating it as a local path. Only the exact scheme
/// `http` is remote.
pub fn classify_reference(reference: &str) -> Result<ReferenceKind, ClassificationError> {
    let scheme = scheme_of(reference)?;

    if let Some((index, character)) = reference
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control() || ILLEGAL_CHARACTERS.contains(c))
    {
        return Err(ClassificationError::IllegalCharacter {
            reference: reference.to_string(),
            character,
            index,
        });
    }

    match scheme {
        Some("http") => Url::parse(reference)
            .map(ReferenceKind::Remote)
            .map_err(|source| ClassificationError::MalformedUrl {
                reference: reference.to_string(),
                source,
            }),
        _ => Ok(ReferenceKind::Local),
    }
}

/// Scheme of `reference`, if it has one. A ':' only delimits a scheme when it
/// comes before any '/', '?' or '#'.
fn scheme_of(reference: &str) -> Result<Option<&str>, ClassificationError> {
    let Some(end) = reference.find([':', '/', '?', '#']) else {
        return Ok(None);
    };
    if !reference[end..].starts_with(':') {
        return Ok(None);
    }

    let scheme = &reference[..end];
    let invalid = |index| ClassificationError::InvalidScheme {
        reference: reference.to_string(),
        index,
    };

    let mut chars = scheme.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid(0)),
    }
    if let Some((index, _)) =
        chars.find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
    {
        return Err(invalid(index));
    }

    Ok(Some(scheme))
}

/// Copies artifacts into the archive on behalf of one discovery run.
pub struct ArtifactRelocator<'a> {
    archive: &'a mut dyn ArchiveWriter,
    fs: &'a dyn FileSystem,
    failures: Vec<RelocationError>,
}

impl<'a> ArtifactRelocator<'a> {
    pub fn new(archive: &'a mut dyn ArchiveWriter, fs: &'a dyn FileSystem) -> Self {
        Self {
            archive,
            fs,
            failures: Vec::new(),
        }
    }

    /// Canonicalizes a local configuration file and stores it under the
    /// cluster's archive namespace. Directories are rejected.
    pub fn relocate_config_file(
        &mut self,
        cluster: &str,
        reference: &str,
    ) -> Result<String, RelocationError> {
        let canonical = self
            .fs
            .canonicalize(Path::new(reference))
            .map_err(|e| RelocationError::Canonicalize {
                cluster: cluster.to_string(),
                reference: reference.to_string(),
                reason: format!("{:#}", e),
            })?;
        if !self.fs.is_file(&canonical) {
            return Err(RelocationError::Canonicalize {
                cluster: cluster.to_string(),
                reference: reference.to_string(),
                reason: format!("{} is not a regular file", canonical.display()),
            });
        }

        let name = self
            .archive
            .add_config_file(cluster, &canonical)
            .map_err(|source| archive_failure(cluster, reference, "file", source))?;

        debug!(
            code = codes::CONFIG_FILE_ADDED,
            cluster,
            reference,
            entry = %name,
            "Added configuration file to archive"
        );
        Ok(name)
    }

    /// Stores a cache configuration that may live at an `http` URL or on the
    /// local file system.
    pub fn relocate_cache_config(
        &mut self,
        cluster: &str,
        reference: &str,
    ) -> Result<String, RelocationError> {
        let kind = classify_reference(reference).unwrap_or_else(|e| {
            warn!(
                code = codes::CLASSIFICATION_FAILED,
                cluster,
                reference,
                error = %e,
                "Cache configuration reference is not a valid URI, treating it as a local file"
            );
            ReferenceKind::Local
        });

        match kind {
            ReferenceKind::Remote(url) => {
                let name = self
                    .archive
                    .add_config_file_from_url(cluster, &url)
                    .map_err(|source| archive_failure(cluster, reference, "url", source))?;
                info!(
                    code = codes::URL_ADDED,
                    cluster,
                    url = %url,
                    entry = %name,
                    "Added cache configuration from URL to archive"
                );
                Ok(name)
            }
            ReferenceKind::Local => {
                let name = self.relocate_config_file(cluster, reference)?;
                info!(
                    code = codes::CACHE_FILE_ADDED,
                    cluster,
                    reference,
                    entry = %name,
                    "Added cache configuration file to archive"
                );
                Ok(name)
            }
        }
    }

    /// Allocates a persistence directory of `kind` for the cluster. The
    /// original directory is never read.
    pub fn relocate_persistence_directory(
        &mut self,
        cluster: &str,
        reference: &str,
        kind: PersistenceKind,
    ) -> Result<String, RelocationError> {
        let name = self
            .archive
            .add_persistence_directory(cluster, kind)
            .map_err(|source| archive_failure(cluster, reference, kind.as_str(), source))?;

        info!(
            code = codes::PERSISTENCE_DIRECTORY_ADDED,
            cluster,
            reference,
            kind = %kind,
            entry = %name,
            "Added persistence directory to archive"
        );
        Ok(name)
    }

    pub fn record_failure(&mut self, failure: RelocationError) {
        self.failures.push(failure);
    }

    /// Forgets the failures of a previous run.
    pub fn reset_failures(&mut self) {
        self.failures.clear();
    }

    /// Relocation failures of this run, in the order they occurred.
    pub fn failures(&self) -> &[RelocationError] {
        &self.failures
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

fn archive_failure(
    cluster: &str,
    reference: &str,
    kind: &'static str,
    source: ArchiveError,
) -> RelocationError {
    RelocationError::Archive {
        cluster: cluster.to_string(),
        reference: reference.to_string(),
        kind,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveEntry, InMemoryArchive, MockArchiveWriter};
    use crate::fs::MockFileSystem;
    use yare::parameterized;

    #[derive(Debug, PartialEq)]
    enum Expected {
        Remote,
        Local,
        Invalid,
    }

    #[parameterized(
        http_url = { "http://host/path/cache.xml", Expected::Remote },
        http_with_port = { "http://host:8080/cache.xml?v=2", Expected::Remote },
        absolute_path = { "/local/fs/cache.xml", Expected::Local },
        relative_path = { "config/cache.xml", Expected::Local },
        https_is_local = { "https://host/path/cache.xml", Expected::Local },
        upper_case_scheme = { "HTTP://host/cache.xml", Expected::Local },
        file_url = { "file:///tmp/cache.xml", Expected::Local },
        colon_after_slash = { "./a:b/cache.xml", Expected::Local },
        not_a_uri = { "::not a valid uri::", Expected::Invalid },
        space_in_path = { "/opt/my configs/cache.xml", Expected::Invalid },
        windows_path = { "C:\\coherence\\cache.xml", Expected::Invalid },
        digit_scheme = { "1http://host/cache.xml", Expected::Invalid },
    )]
    fn test_classify_reference(reference: &str, expected: Expected) {
        let actual = match classify_reference(reference) {
            Ok(ReferenceKind::Remote(_)) => Expected::Remote,
            Ok(ReferenceKind::Local) => Expected::Local,
            Err(_) => Expected::Invalid,
        };
        assert_eq!(actual, expected, "classification of {:?}", reference);
    }

    #[test]
    fn test_invalid_scheme_reports_index() {
        let err = classify_reference("::not a valid uri::").unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidScheme { index: 0, .. }));
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn test_remote_keeps_parsed_url() {
        let Ok(ReferenceKind::Remote(url)) = classify_reference("http://host/path/cache.xml") else {
            panic!("expected remote reference");
        };
        assert_eq!(url.host_str(), Some("host"));
        assert_eq!(url.path(), "/path/cache.xml");
    }

    #[test]
    fn test_config_file_is_canonicalized_before_archiving() {
        let fs = MockFileSystem::with_root("/domain".into());
        fs.add_file("config/cluster.xml", "<cluster/>");
        let mut archive = MockArchiveWriter::new();
        archive
            .expect_add_config_file()
            .withf(|cluster, file| cluster == "c1" && file == Path::new("/domain/config/cluster.xml"))
            .times(1)
            .returning(|_, _| Ok("wlsdeploy/coherence/c1/cluster.xml".to_string()));

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let name = relocator
            .relocate_config_file("c1", "config/cluster.xml")
            .unwrap();

        assert_eq!(name, "wlsdeploy/coherence/c1/cluster.xml");
    }

    #[test]
    fn test_canonicalize_failure_skips_archive() {
        let fs = MockFileSystem::new();
        let mut archive = MockArchiveWriter::new();
        archive.expect_add_config_file().never();

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let err = relocator
            .relocate_config_file("c1", "/missing/cluster.xml")
            .unwrap_err();

        assert!(matches!(err, RelocationError::Canonicalize { .. }));
        assert_eq!(err.cluster(), "c1");
    }

    #[test]
    fn test_directory_is_not_a_config_file() {
        let fs = MockFileSystem::new();
        fs.add_dir("/u01/config");
        let mut archive = MockArchiveWriter::new();
        archive.expect_add_config_file().never();

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let err = relocator.relocate_config_file("c1", "/u01/config").unwrap_err();

        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_http_cache_config_goes_to_url_archiving() {
        let fs = MockFileSystem::new();
        let mut archive = MockArchiveWriter::new();
        archive
            .expect_add_config_file_from_url()
            .withf(|cluster, url| cluster == "c1" && url.as_str() == "http://host/path/cache.xml")
            .times(1)
            .returning(|_, _| Ok("wlsdeploy/coherence/c1/cache.xml".to_string()));
        archive.expect_add_config_file().never();

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let name = relocator
            .relocate_cache_config("c1", "http://host/path/cache.xml")
            .unwrap();

        assert_eq!(name, "wlsdeploy/coherence/c1/cache.xml");
    }

    #[test]
    fn test_local_cache_config_goes_to_file_archiving() {
        let fs = MockFileSystem::new();
        fs.add_file("/local/fs/cache.xml", "<cache-config/>");
        let mut archive = MockArchiveWriter::new();
        archive.expect_add_config_file_from_url().never();
        archive
            .expect_add_config_file()
            .times(1)
            .returning(|_, _| Ok("wlsdeploy/coherence/c1/cache.xml".to_string()));

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        assert!(relocator
            .relocate_cache_config("c1", "/local/fs/cache.xml")
            .is_ok());
    }

    #[test]
    fn test_unclassifiable_cache_config_falls_back_to_file() {
        let fs = MockFileSystem::new();
        fs.add_file("::not a valid uri::", "<cache-config/>");
        let mut archive = MockArchiveWriter::new();
        archive.expect_add_config_file_from_url().never();
        archive
            .expect_add_config_file()
            .withf(|_, file| file == Path::new("/mock/::not a valid uri::"))
            .times(1)
            .returning(|_, _| Ok("wlsdeploy/coherence/c1/::not a valid uri::".to_string()));

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        assert!(relocator
            .relocate_cache_config("c1", "::not a valid uri::")
            .is_ok());
    }

    #[test]
    fn test_url_archive_failure_is_reported() {
        let fs = MockFileSystem::new();
        let mut archive = MockArchiveWriter::new();
        archive.expect_add_config_file_from_url().returning(|_, url| {
            Err(ArchiveError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
        });

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let err = relocator
            .relocate_cache_config("c1", "http://host/missing.xml")
            .unwrap_err();

        assert!(matches!(err, RelocationError::Archive { kind: "url", .. }));
    }

    #[test]
    fn test_persistence_directory_ignores_original_value() {
        let fs = MockFileSystem::new();
        let mut archive = MockArchiveWriter::new();
        archive
            .expect_add_persistence_directory()
            .withf(|cluster, kind| cluster == "c1" && *kind == PersistenceKind::Snapshot)
            .times(1)
            .returning(|_, _| Ok("wlsdeploy/coherence/c1/snapshot/".to_string()));

        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
        let name = relocator
            .relocate_persistence_directory("c1", "/does/not/exist", PersistenceKind::Snapshot)
            .unwrap();

        assert_eq!(name, "wlsdeploy/coherence/c1/snapshot/");
    }

    #[test]
    fn test_failures_are_recorded_in_order() {
        let fs = MockFileSystem::new();
        let mut archive = InMemoryArchive::new();
        let mut relocator = ArtifactRelocator::new(&mut archive, &fs);

        for reference in ["/a.xml", "/b.xml"] {
            let err = relocator.relocate_config_file("c1", reference).unwrap_err();
            relocator.record_failure(err);
        }

        assert_eq!(relocator.failure_count(), 2);
        assert!(relocator.failures()[1].to_string().contains("/b.xml"));
    }

    #[test]
    fn test_in_memory_archive_receives_canonical_path() {
        let fs = MockFileSystem::new();
        fs.add_file("/tmp/cache-config.xml", "<cache-config/>");
        let mut archive = InMemoryArchive::new();

        {
            let mut relocator = ArtifactRelocator::new(&mut archive, &fs);
            relocator
                .relocate_cache_config("myCluster", "/tmp/cache-config.xml")
                .unwrap();
        }

        assert!(matches!(
            &archive.entries()[0],
            ArchiveEntry::File { name, .. } if name == "wlsdeploy/coherence/myCluster/cache-config.xml"
        ));
    }
}
