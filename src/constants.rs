//! Well-known folder and attribute names of the Coherence resource model.

pub const COHERENCE_CLUSTER_SYSTEM_RESOURCE: &str = "CoherenceClusterSystemResource";
pub const COHERENCE_CACHE_CONFIG: &str = "CoherenceCacheConfig";
pub const COHERENCE_RESOURCE: &str = "CoherenceResource";

pub const COHERENCE_CUSTOM_CLUSTER_CONFIGURATION: &str = "CustomClusterConfigurationFileName";
pub const COHERENCE_CACHE_CONFIG_FILE: &str = "CoherenceCacheConfigFile";
pub const COHERENCE_ACTIVE_DIRECTORY: &str = "ActiveDirectory";
pub const COHERENCE_SNAPSHOT_DIRECTORY: &str = "SnapshotDirectory";
pub const COHERENCE_TRASH_DIRECTORY: &str = "TrashDirectory";

/// Archive prefix under which all Coherence artifacts are stored.
pub const ARCHIVE_COHERENCE_TARGET_DIR: &str = "wlsdeploy/coherence";

/// Top-level model section the discovered resources are written under.
pub const RESOURCES: &str = "resources";

/// Message codes carried in the `code` field of discovery log events.
pub mod codes {
    pub const DISCOVER_START: &str = "COHDISC-100";
    pub const CLUSTER_COUNT: &str = "COHDISC-101";
    pub const CLUSTER: &str = "COHDISC-102";
    pub const INSTANCE: &str = "COHDISC-103";
    pub const CANONICALIZE_FAILED: &str = "COHDISC-104";
    pub const CONFIG_FILE_ADDED: &str = "COHDISC-105";
    pub const CONFIG_FILE_FAILED: &str = "COHDISC-106";
    pub const URL_ADDED: &str = "COHDISC-107";
    pub const ARTIFACT_FAILED: &str = "COHDISC-108";
    pub const CACHE_FILE_ADDED: &str = "COHDISC-109";
    pub const PERSISTENCE_DIRECTORY_ADDED: &str = "COHDISC-110";
    pub const CLASSIFICATION_FAILED: &str = "COHDISC-111";
    pub const NAME_COLLISION: &str = "COHDISC-112";
}
