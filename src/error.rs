use thiserror::Error;

/// A token was resolved that is not bound on the location.
///
/// This is a traversal defect (a bind without a matching descent, or an
/// unbind that happened too early) and is never converted into a soft failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Token '{token}' is not bound at location {location}")]
    UnboundToken { token: String, location: String },
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Folder path '{0}' is not defined by the provider")]
    UnknownFolder(String),

    #[error("Folder '{0}' has no name token")]
    NoNameToken(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid archive argument: {0}")]
    InvalidArgument(String),

    #[error("Archive entry '{0}' already exists")]
    Duplicate(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Archive I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Illegal character {character:?} at index {index} in '{reference}'")]
    IllegalCharacter {
        reference: String,
        character: char,
        index: usize,
    },

    #[error("Expected scheme name at index {index} in '{reference}'")]
    InvalidScheme { reference: String, index: usize },

    #[error("Malformed URL '{reference}': {source}")]
    MalformedUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("Unable to resolve '{reference}' for cluster '{cluster}': {reason}")]
    Canonicalize {
        cluster: String,
        reference: String,
        reason: String,
    },

    #[error("Unable to archive {kind} '{reference}' for cluster '{cluster}': {source}")]
    Archive {
        cluster: String,
        reference: String,
        kind: &'static str,
        #[source]
        source: ArchiveError,
    },
}

impl RelocationError {
    pub fn cluster(&self) -> &str {
        match self {
            RelocationError::Canonicalize { cluster, .. } => cluster,
            RelocationError::Archive { cluster, .. } => cluster,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("An attribute handler is already registered for '{0}'")]
    DuplicateHandler(String),
}

/// Errors that abort a discovery run.
///
/// Artifact relocation failures never appear here; they are logged and the
/// affected attribute is dropped from the model.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Location lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Resource provider failed: {0}")]
    Provider(#[from] ProviderError),
}
