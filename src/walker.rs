//! Depth-first traversal of the resource tree.
//!
//! The walker is schema-agnostic: which folders exist below a node, and
//! whether a folder holds named instances or a single unnamed node, is asked
//! of the [`ResourceProvider`] at each step. Every descent goes through the
//! scoped guards on [`LocationPath`], so the location is back at its entry
//! depth whenever a walk returns, including on error.

use crate::constants::codes;
use crate::error::DiscoveryError;
use crate::handlers::AttributeHandlerRegistry;
use crate::location::LocationPath;
use crate::model::{add_to_model_if_not_empty, Model, ModelValue};
use crate::provider::{FolderKind, ResourceProvider};
use crate::relocation::ArtifactRelocator;
use tracing::{debug, trace, warn};

pub struct ResourceTreeWalker<'a> {
    provider: &'a dyn ResourceProvider,
    handlers: AttributeHandlerRegistry,
    relocator: ArtifactRelocator<'a>,
}

impl<'a> ResourceTreeWalker<'a> {
    pub fn new(
        provider: &'a dyn ResourceProvider,
        handlers: AttributeHandlerRegistry,
        relocator: ArtifactRelocator<'a>,
    ) -> Self {
        Self {
            provider,
            handlers,
            relocator,
        }
    }

    pub fn handlers(&self) -> &AttributeHandlerRegistry {
        &self.handlers
    }

    pub fn relocator(&self) -> &ArtifactRelocator<'a> {
        &self.relocator
    }

    pub fn relocator_mut(&mut self) -> &mut ArtifactRelocator<'a> {
        &mut self.relocator
    }

    /// Walks the folder `folder` below `location`.
    ///
    /// A folder of named instances yields `instance name -> node`, with an
    /// entry for every instance even when its node is empty. A single folder
    /// yields its node directly.
    pub fn walk_folder(
        &mut self,
        location: &mut LocationPath,
        folder: &str,
    ) -> Result<Model, DiscoveryError> {
        let mut location = location.enter(folder);
        let result = match self.provider.folder_kind(&location)? {
            FolderKind::Multiple => self.walk_instances(&mut location)?,
            FolderKind::Single => self.walk_node(&mut location)?,
        };
        trace!(path = %location.folder_path(), entries = result.len(), "Walked folder");
        Ok(result)
    }

    /// Walks every instance of the folder `location` points at.
    pub fn walk_instances(&mut self, location: &mut LocationPath) -> Result<Model, DiscoveryError> {
        let mut result = Model::new();
        let names = self.provider.list_instance_names(location)?;
        if names.is_empty() {
            return Ok(result);
        }

        let token = self.provider.get_name_token(location)?;
        for name in names {
            debug!(
                code = codes::INSTANCE,
                instance = %name,
                path = %location.folder_path(),
                "Discovering instance"
            );
            let mut instance = location.bind(token.clone(), name.clone());
            let node = self.walk_node(&mut instance)?;
            result.insert(name, ModelValue::Folder(node));
        }
        Ok(result)
    }

    /// Attributes of the node at `location` followed by its non-empty
    /// sub-folders, in provider order.
    ///
    /// A sub-folder named like an attribute that is present is skipped, not
    /// walked, and the attribute is kept.
    pub fn walk_node(&mut self, location: &mut LocationPath) -> Result<Model, DiscoveryError> {
        let mut node = self.read_attributes(location)?;

        for subfolder in self.provider.subfolder_names(location)? {
            if node.contains_key(&subfolder) {
                warn!(
                    code = codes::NAME_COLLISION,
                    path = %location.folder_path(),
                    folder = %subfolder,
                    "Sub-folder has the same name as an attribute, keeping the attribute"
                );
                continue;
            }
            let result = self.walk_folder(location, &subfolder)?;
            add_to_model_if_not_empty(&mut node, &subfolder, result);
        }
        Ok(node)
    }

    /// Null values are left out, whether the provider reported them or a
    /// handler produced them.
    fn read_attributes(&mut self, location: &LocationPath) -> Result<Model, DiscoveryError> {
        let raw = self.provider.read_attributes(location)?;
        let mut attributes = Model::with_capacity(raw.len());

        for (name, value) in raw {
            if value.is_null() {
                continue;
            }
            let value = self
                .handlers
                .apply(&name, value, location, self.provider, &mut self.relocator)?;
            if !value.is_null() {
                attributes.insert(name, value);
            }
        }
        Ok(attributes)
    }
}
