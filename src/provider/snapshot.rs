//! Provider backed by a captured copy of the resource tree.
//!
//! Snapshots are plain YAML or JSON documents:
//!
//! ```yaml
//! CoherenceClusterSystemResource:
//!   instances:
//!     myCluster:
//!       attributes:
//!         CoherenceCacheConfigFile: /tmp/cache-config.xml
//!       folders:
//!         CoherenceResource:
//!           kind: single
//!           attributes:
//!             ActiveDirectory: /var/coherence/active
//! ```

use super::{FolderKind, ResourceProvider};
use crate::error::ProviderError;
use crate::fs::FileSystem;
use crate::location::LocationPath;
use crate::model::{Model, ModelValue};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: Model,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub folders: IndexMap<String, FolderSnapshot>,
}

impl NodeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<ModelValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_folder(mut self, name: &str, folder: FolderSnapshot) -> Self {
        self.folders.insert(name.to_string(), folder);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderSnapshot {
    #[serde(default)]
    pub kind: FolderKind,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub instances: IndexMap<String, NodeSnapshot>,
    /// Content of a [`FolderKind::Single`] folder.
    #[serde(flatten)]
    pub node: NodeSnapshot,
}

impl FolderSnapshot {
    pub fn multiple() -> Self {
        Self::default()
    }

    pub fn single(node: NodeSnapshot) -> Self {
        Self {
            kind: FolderKind::Single,
            instances: IndexMap::new(),
            node,
        }
    }

    pub fn with_instance(mut self, name: &str, node: NodeSnapshot) -> Self {
        self.instances.insert(name.to_string(), node);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotProvider {
    folders: IndexMap<String, FolderSnapshot>,
}

impl SnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, name: &str, folder: FolderSnapshot) -> Self {
        self.folders.insert(name.to_string(), folder);
        self
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let folders = serde_yaml::from_str(content).context("Failed to parse YAML snapshot")?;
        Ok(Self { folders })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let folders = serde_json::from_str(content).context("Failed to parse JSON snapshot")?;
        Ok(Self { folders })
    }

    /// Loads a snapshot file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.with_context(|| format!("Invalid snapshot {}", path.display()))
    }

    fn name_token_for(folder: &str) -> String {
        folder.to_uppercase()
    }

    /// Walks to the folder named by the last segment of `location`, selecting
    /// intermediate instances through their bound tokens. A folder missing
    /// from the snapshot resolves to `None`.
    fn find_folder(&self, location: &LocationPath) -> Result<Option<&FolderSnapshot>, ProviderError> {
        let segments = location.folders();
        let mut folders = &self.folders;

        for (index, name) in segments.iter().enumerate() {
            let Some(folder) = folders.get(name) else {
                return Ok(None);
            };
            if index + 1 == segments.len() {
                return Ok(Some(folder));
            }
            folders = match folder.kind {
                FolderKind::Single => &folder.node.folders,
                FolderKind::Multiple => &self.instance(folder, name, location)?.folders,
            };
        }

        Ok(None)
    }

    fn instance<'a>(
        &self,
        folder: &'a FolderSnapshot,
        folder_name: &str,
        location: &LocationPath,
    ) -> Result<&'a NodeSnapshot, ProviderError> {
        let instance_name = location.resolve_token(&Self::name_token_for(folder_name))?;
        folder
            .instances
            .get(instance_name)
            .ok_or_else(|| ProviderError::UnknownFolder(location.to_string()))
    }

    fn find_node(&self, location: &LocationPath) -> Result<Option<&NodeSnapshot>, ProviderError> {
        let (Some(folder), Some(name)) = (self.find_folder(location)?, location.current_folder())
        else {
            return Ok(None);
        };
        match folder.kind {
            FolderKind::Single => Ok(Some(&folder.node)),
            FolderKind::Multiple => self.instance(folder, name, location).map(Some),
        }
    }
}

impl ResourceProvider for SnapshotProvider {
    fn list_instance_names(&self, location: &LocationPath) -> Result<Vec<String>, ProviderError> {
        Ok(match self.find_folder(location)? {
            Some(folder) if folder.kind == FolderKind::Multiple => {
                folder.instances.keys().cloned().collect()
            }
            _ => Vec::new(),
        })
    }

    fn read_attributes(&self, location: &LocationPath) -> Result<Model, ProviderError> {
        Ok(self
            .find_node(location)?
            .map(|node| node.attributes.clone())
            .unwrap_or_default())
    }

    fn get_name_token(&self, location: &LocationPath) -> Result<String, ProviderError> {
        let name = location
            .current_folder()
            .ok_or_else(|| ProviderError::NoNameToken(location.folder_path()))?;
        match self.find_folder(location)? {
            Some(folder) if folder.kind == FolderKind::Single => {
                Err(ProviderError::NoNameToken(location.folder_path()))
            }
            _ => Ok(Self::name_token_for(name)),
        }
    }

    fn subfolder_names(&self, location: &LocationPath) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .find_node(location)?
            .map(|node| node.folders.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn folder_kind(&self, location: &LocationPath) -> Result<FolderKind, ProviderError> {
        Ok(self
            .find_folder(location)?
            .map(|folder| folder.kind)
            .unwrap_or_default())
    }
}
