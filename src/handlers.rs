//! Attribute handlers: attributes whose values name external artifacts are
//! relocated into the archive instead of being copied into the model.

use crate::archive::PersistenceKind;
use crate::constants::{
    codes, COHERENCE_ACTIVE_DIRECTORY, COHERENCE_CACHE_CONFIG_FILE,
    COHERENCE_CLUSTER_SYSTEM_RESOURCE, COHERENCE_CUSTOM_CLUSTER_CONFIGURATION,
    COHERENCE_SNAPSHOT_DIRECTORY, COHERENCE_TRASH_DIRECTORY,
};
use crate::error::{DiscoveryError, RegistryError, RelocationError};
use crate::location::LocationPath;
use crate::model::ModelValue;
use crate::provider::ResourceProvider;
use crate::relocation::ArtifactRelocator;
use indexmap::IndexMap;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeHandler {
    /// Custom cluster configuration file, always a local path.
    CustomConfiguration,
    /// Cache configuration, either an `http` URL or a local path.
    CacheConfiguration,
    /// Persistence directory replaced by an archive directory of the kind.
    PersistenceDirectory(PersistenceKind),
}

impl AttributeHandler {
    fn relocate(
        self,
        relocator: &mut ArtifactRelocator<'_>,
        cluster: &str,
        reference: &str,
    ) -> Result<String, RelocationError> {
        match self {
            AttributeHandler::CustomConfiguration => relocator.relocate_config_file(cluster, reference),
            AttributeHandler::CacheConfiguration => relocator.relocate_cache_config(cluster, reference),
            AttributeHandler::PersistenceDirectory(kind) => {
                relocator.relocate_persistence_directory(cluster, reference, kind)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttributeHandlerRegistry {
    handlers: IndexMap<String, AttributeHandler>,
}

impl AttributeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers of the Coherence resources discoverer.
    pub fn coherence_defaults() -> Self {
        let handlers = [
            (COHERENCE_CUSTOM_CLUSTER_CONFIGURATION, AttributeHandler::CustomConfiguration),
            (COHERENCE_CACHE_CONFIG_FILE, AttributeHandler::CacheConfiguration),
            (
                COHERENCE_ACTIVE_DIRECTORY,
                AttributeHandler::PersistenceDirectory(PersistenceKind::Active),
            ),
            (
                COHERENCE_SNAPSHOT_DIRECTORY,
                AttributeHandler::PersistenceDirectory(PersistenceKind::Snapshot),
            ),
            (
                COHERENCE_TRASH_DIRECTORY,
                AttributeHandler::PersistenceDirectory(PersistenceKind::Trash),
            ),
        ];

        Self {
            handlers: handlers
                .into_iter()
                .map(|(name, handler)| (name.to_string(), handler))
                .collect(),
        }
    }

    pub fn register(&mut self, attribute: &str, handler: AttributeHandler) -> Result<(), RegistryError> {
        if self.handlers.contains_key(attribute) {
            return Err(RegistryError::DuplicateHandler(attribute.to_string()));
        }
        self.handlers.insert(attribute.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, attribute: &str) -> Option<AttributeHandler> {
        self.handlers.get(attribute).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Final model value of `attribute`.
    ///
    /// Without a handler the raw value passes through unchanged. A relocation
    /// failure is logged, recorded on the relocator and yields
    /// [`ModelValue::Null`]. Only errors resolving the owning cluster escape.
    pub fn apply(
        &self,
        attribute: &str,
        raw: ModelValue,
        location: &LocationPath,
        provider: &dyn ResourceProvider,
        relocator: &mut ArtifactRelocator<'_>,
    ) -> Result<ModelValue, DiscoveryError> {
        let Some(handler) = self.get(attribute) else {
            return Ok(raw);
        };
        let Some(reference) = raw.as_reference() else {
            return Ok(raw);
        };

        let cluster = owning_cluster(location, provider)?;
        trace!(cluster = %cluster, attribute, reference = %reference, ?handler, "Applying attribute handler");

        match handler.relocate(relocator, &cluster, &reference) {
            Ok(name) => Ok(ModelValue::Text(name)),
            Err(failure) => {
                warn!(
                    code = failure_code(&failure),
                    cluster = %cluster,
                    attribute,
                    reference = %reference,
                    error = %failure,
                    "Unable to relocate artifact, dropping attribute"
                );
                relocator.record_failure(failure);
                Ok(ModelValue::Null)
            }
        }
    }
}

fn failure_code(failure: &RelocationError) -> &'static str {
    match failure {
        RelocationError::Canonicalize { .. } => codes::CANONICALIZE_FAILED,
        RelocationError::Archive { kind: "file", .. } => codes::CONFIG_FILE_FAILED,
        RelocationError::Archive { .. } => codes::ARTIFACT_FAILED,
    }
}

/// Name of the cluster that owns `location`, read through the cluster
/// folder's name token.
fn owning_cluster(
    location: &LocationPath,
    provider: &dyn ResourceProvider,
) -> Result<String, DiscoveryError> {
    let cluster_folder = LocationPath::from_folders([COHERENCE_CLUSTER_SYSTEM_RESOURCE]);
    let token = provider.get_name_token(&cluster_folder)?;
    Ok(location.resolve_token(&token)?.to_string())
}
