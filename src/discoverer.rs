//! Discovery of the Coherence cluster resources of a domain.

use crate::archive::ArchiveWriter;
use crate::constants::{codes, COHERENCE_CLUSTER_SYSTEM_RESOURCE};
use crate::error::{DiscoveryError, RelocationError};
use crate::fs::FileSystem;
use crate::handlers::AttributeHandlerRegistry;
use crate::location::LocationPath;
use crate::model::{add_to_model_if_not_empty, Model, ModelValue};
use crate::provider::ResourceProvider;
use crate::relocation::ArtifactRelocator;
use crate::walker::ResourceTreeWalker;
use tracing::{debug, info, trace};

/// Walks every `CoherenceClusterSystemResource` below the base location and
/// folds the clusters into the resources model.
///
/// Artifact relocation failures never fail a run; they are logged, the
/// attribute is dropped and the failure is counted. Only provider errors
/// and unbound tokens abort discovery.
pub struct CoherenceResourcesDiscoverer<'a> {
    provider: &'a dyn ResourceProvider,
    walker: ResourceTreeWalker<'a>,
    base_location: LocationPath,
    resources: Model,
}

impl<'a> CoherenceResourcesDiscoverer<'a> {
    pub fn new(
        provider: &'a dyn ResourceProvider,
        archive: &'a mut dyn ArchiveWriter,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self::with_handlers(
            provider,
            archive,
            fs,
            AttributeHandlerRegistry::coherence_defaults(),
        )
    }

    pub fn with_handlers(
        provider: &'a dyn ResourceProvider,
        archive: &'a mut dyn ArchiveWriter,
        fs: &'a dyn FileSystem,
        handlers: AttributeHandlerRegistry,
    ) -> Self {
        let relocator = ArtifactRelocator::new(archive, fs);
        Self {
            provider,
            walker: ResourceTreeWalker::new(provider, handlers, relocator),
            base_location: LocationPath::new(),
            resources: Model::new(),
        }
    }

    /// Scopes discovery below `location`, e.g. a resource group. The value is
    /// copied for each run and never modified.
    pub fn base_location(mut self, location: LocationPath) -> Self {
        self.base_location = location;
        self
    }

    /// Model that discovered clusters are added to, instead of an empty one.
    pub fn resources(mut self, resources: Model) -> Self {
        self.resources = resources;
        self
    }

    /// Runs discovery and returns the model key the clusters were stored
    /// under, along with the resources model. The key is absent from the
    /// model when no cluster was found.
    ///
    /// Failures reported afterwards belong to this call only.
    pub fn discover(&mut self) -> Result<(String, Model), DiscoveryError> {
        self.walker.relocator_mut().reset_failures();
        debug!(
            code = codes::DISCOVER_START,
            base = %self.base_location,
            "Discovering Coherence resources"
        );

        let (key, clusters) = self.get_coherence_clusters()?;
        add_to_model_if_not_empty(&mut self.resources, &key, clusters);

        trace!(
            key = %key,
            failures = self.failure_count(),
            "Finished Coherence resource discovery"
        );
        Ok((key, self.resources.clone()))
    }

    pub fn failures(&self) -> &[RelocationError] {
        self.walker.relocator().failures()
    }

    pub fn failure_count(&self) -> usize {
        self.walker.relocator().failure_count()
    }

    fn get_coherence_clusters(&mut self) -> Result<(String, Model), DiscoveryError> {
        let mut base = self.base_location.clone();
        let mut location = base.enter(COHERENCE_CLUSTER_SYSTEM_RESOURCE);
        let mut result = Model::new();

        let clusters = self.provider.list_instance_names(&location)?;
        info!(
            code = codes::CLUSTER_COUNT,
            count = clusters.len(),
            "Discovering Coherence clusters"
        );
        if clusters.is_empty() {
            return Ok((COHERENCE_CLUSTER_SYSTEM_RESOURCE.to_string(), result));
        }

        let token = self.provider.get_name_token(&location)?;
        for cluster in clusters {
            info!(code = codes::CLUSTER, cluster = %cluster, "Adding Coherence cluster");
            let mut cluster_location = location.bind(token.clone(), cluster.clone());
            let node = self.walker.walk_node(&mut cluster_location)?;
            result.insert(cluster, ModelValue::Folder(node));
        }

        Ok((COHERENCE_CLUSTER_SYSTEM_RESOURCE.to_string(), result))
    }
}
