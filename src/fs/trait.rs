//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Abstraction over the file system operations discovery performs on
/// artifact references, so relocation can be exercised without touching disk.
pub trait FileSystem: Send + Sync {
    /// Check if path is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Resolve a path to its absolute, symlink-free form
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}
