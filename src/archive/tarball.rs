use super::{
    config_file_entry_name, file_name_of, persistence_entry_name, url_file_name,
    validate_cluster_name, ArchiveWriter, Claim, EntryLedger, PersistenceKind,
};
use crate::error::ArchiveError;
use ::tar::{Builder, EntryType, Header, HeaderMode};
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

enum Sink {
    Plain(File),
    Gzip(GzEncoder<File>),
}

impl Sink {
    fn finish(self) -> io::Result<()> {
        match self {
            Sink::Plain(mut file) => file.flush(),
            Sink::Gzip(encoder) => encoder.finish().and_then(|mut file| file.flush()),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(file) => file.write(buf),
            Sink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(file) => file.flush(),
            Sink::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Writes the portable archive as a tar file, gzipped when the path ends in
/// `.gz` or `.tgz`.
pub struct TarArchiveWriter {
    path: PathBuf,
    builder: Builder<Sink>,
    ledger: EntryLedger,
    client: Client,
}

impl TarArchiveWriter {
    pub fn create(path: impl AsRef<Path>, http_timeout: Duration) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ArchiveError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let sink = if is_gzip_path(&path) {
            Sink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Sink::Plain(file)
        };

        let mut builder = Builder::new(sink);
        builder.mode(HeaderMode::Deterministic);

        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| ArchiveError::InvalidArgument(format!("HTTP client setup failed: {}", e)))?;

        debug!(path = %path.display(), gzip = is_gzip_path(&path), "Created archive");

        Ok(Self {
            path,
            builder,
            ledger: EntryLedger::new(),
            client,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> usize {
        self.ledger.len()
    }

    /// Writes the tar trailer and flushes the file.
    pub fn finish(self) -> Result<PathBuf, ArchiveError> {
        let path = self.path;
        let io_err = |source| ArchiveError::Io {
            path: path.display().to_string(),
            source,
        };

        let sink = self.builder.into_inner().map_err(io_err)?;
        sink.finish().map_err(io_err)?;

        info!(path = %path.display(), entries = self.ledger.len(), "Archive written");
        Ok(path)
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>, ArchiveError> {
        let fetch_err = |reason: String| ArchiveError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Runs `write` only for a newly claimed name and releases the name again
    /// if the write fails.
    fn write_claimed<F>(&mut self, name: &str, source: &str, write: F) -> Result<String, ArchiveError>
    where
        F: FnOnce(&mut Self) -> Result<(), ArchiveError>,
    {
        if self.ledger.claim(name, source)? == Claim::Existing {
            debug!(entry = name, "Archive entry already present");
            return Ok(name.to_string());
        }

        if let Err(e) = write(self) {
            self.ledger.release(name);
            return Err(e);
        }

        debug!(entry = name, source, "Added archive entry");
        Ok(name.to_string())
    }
}

impl ArchiveWriter for TarArchiveWriter {
    fn add_config_file(&mut self, cluster: &str, file: &Path) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        if !file.is_file() {
            return Err(ArchiveError::InvalidArgument(format!(
                "'{}' is not a regular file",
                file.display()
            )));
        }

        let name = config_file_entry_name(cluster, &file_name_of(file)?);
        let source = file.display().to_string();
        self.write_claimed(&name, &source, |writer| {
            writer
                .builder
                .append_path_with_name(file, &name)
                .map_err(|source| ArchiveError::Io {
                    path: file.display().to_string(),
                    source,
                })
        })
    }

    fn add_config_file_from_url(&mut self, cluster: &str, url: &Url) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        let name = config_file_entry_name(cluster, &url_file_name(url)?);

        self.write_claimed(&name, url.as_str(), |writer| {
            let body = writer.fetch(url)?;
            let mut header = file_header(body.len() as u64);
            writer
                .builder
                .append_data(&mut header, &name, body.as_slice())
                .map_err(|source| ArchiveError::Io {
                    path: name.clone(),
                    source,
                })
        })
    }

    fn add_persistence_directory(
        &mut self,
        cluster: &str,
        kind: PersistenceKind,
    ) -> Result<String, ArchiveError> {
        validate_cluster_name(cluster)?;
        let name = persistence_entry_name(cluster, kind);

        self.write_claimed(&name, kind.as_str(), |writer| {
            let mut header = directory_header();
            writer
                .builder
                .append_data(&mut header, &name, io::empty())
                .map_err(|source| ArchiveError::Io {
                    path: name.clone(),
                    source,
                })
        })
    }
}

fn is_gzip_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("gz") | Some("tgz")
    )
}

fn file_header(size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    header
}

fn directory_header() -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_mtime(0);
    header.set_cksum();
    header
}
