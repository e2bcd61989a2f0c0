//! coherence-discovery - discovery of Coherence cluster resources
//!
//! This library walks the Coherence cluster resources of a domain, builds an
//! ordered model of their attributes and relocates the artifacts those
//! attributes reference (cache configurations, custom cluster configurations,
//! persistence directories) into a portable archive, rewriting each attribute
//! to the archived name.
//!
//! # Core Concepts
//!
//! - **Location**: the current position in the resource tree, a stack of
//!   folder names plus the instance names bound to each folder's token
//! - **Provider**: source of instance names and attributes for a location
//! - **Attribute handlers**: per-attribute relocation of external artifacts
//! - **Soft failures**: an artifact that cannot be archived drops its
//!   attribute from the model and is logged; discovery carries on
//!
//! # Example Usage
//!
//! ```no_run
//! use coherence_discovery::{
//!     CoherenceResourcesDiscoverer, InMemoryArchive, RealFileSystem, SnapshotProvider,
//! };
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fs = RealFileSystem::new();
//! let provider = SnapshotProvider::load(&fs, Path::new("domain.yaml"))?;
//! let mut archive = InMemoryArchive::new();
//!
//! let mut discoverer = CoherenceResourcesDiscoverer::new(&provider, &mut archive, &fs);
//! let (key, model) = discoverer.discover()?;
//! println!("{}: {} entries", key, model.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`location`]: location stack and scoped descent guards
//! - [`provider`]: resource provider seam and the snapshot provider
//! - [`archive`]: archive writer seam, tar and in-memory writers
//! - [`relocation`]: artifact relocation and reference classification
//! - [`handlers`]: attribute handler registry
//! - [`walker`]: depth-first resource tree traversal
//! - [`discoverer`]: Coherence resources discoverer

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discoverer;
pub mod error;
pub mod fs;
pub mod handlers;
pub mod location;
pub mod model;
pub mod provider;
pub mod relocation;
pub mod util;
pub mod walker;

pub use archive::{ArchiveWriter, InMemoryArchive, PersistenceKind, TarArchiveWriter};
pub use config::{ConfigError, DiscoveryConfig};
pub use discoverer::CoherenceResourcesDiscoverer;
pub use error::{
    ArchiveError, ClassificationError, DiscoveryError, LookupError, ProviderError,
    RegistryError, RelocationError,
};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use handlers::{AttributeHandler, AttributeHandlerRegistry};
pub use location::LocationPath;
pub use model::{add_to_model_if_not_empty, Model, ModelValue};
pub use provider::{FolderKind, ResourceProvider, SnapshotProvider};
pub use relocation::{classify_reference, ArtifactRelocator, ReferenceKind};
pub use util::{init_default, init_logging, LoggingConfig};
pub use walker::ResourceTreeWalker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
