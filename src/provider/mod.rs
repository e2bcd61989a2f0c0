//! Live resource provider seam.
//!
//! Discovery never talks to a server directly. Everything it learns about
//! the resource tree comes through [`ResourceProvider`], addressed by the
//! current [`LocationPath`].

mod snapshot;

pub use snapshot::{FolderSnapshot, NodeSnapshot, SnapshotProvider};

use crate::error::ProviderError;
use crate::location::LocationPath;
use crate::model::Model;
use serde::{Deserialize, Serialize};

/// How instances of a folder are addressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    /// Named instances, each selected by binding the folder's name token.
    #[default]
    Multiple,
    /// A single unnamed child whose attributes are read at the folder itself.
    Single,
}

pub trait ResourceProvider {
    /// Instance names of the folder at `location`, in provider order.
    /// An empty list means the folder has no instances.
    fn list_instance_names(&self, location: &LocationPath) -> Result<Vec<String>, ProviderError>;

    /// Attributes of the node at `location`, in declaration order.
    fn read_attributes(&self, location: &LocationPath) -> Result<Model, ProviderError>;

    /// Token that selects an instance of the folder at `location`.
    fn get_name_token(&self, location: &LocationPath) -> Result<String, ProviderError>;

    /// Declared sub-resource folders of the node at `location`.
    fn subfolder_names(&self, location: &LocationPath) -> Result<Vec<String>, ProviderError>;

    fn folder_kind(&self, location: &LocationPath) -> Result<FolderKind, ProviderError>;
}
