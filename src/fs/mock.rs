use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
struct MockEntry {
    content: Option<String>,
    kind: EntryKind,
}

/// In-memory file system. Relative paths are resolved against the root
/// (`/mock` unless set with [`MockFileSystem::with_root`]).
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    denied: RwLock<HashSet<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            denied: RwLock::new(HashSet::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                kind: EntryKind::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        Self::ensure_parents(&mut files, &path);
    }

    /// Makes every access to `path` fail as if permission were denied.
    pub fn deny(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.denied.write().unwrap().insert(path);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn check_access(&self, path: &Path) -> Result<()> {
        if self.denied.read().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                kind: EntryKind::Directory,
            });
        }
    }

    fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).map(|e| e.kind)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(EntryKind::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        self.check_access(&path)?;
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let normalized = self.normalize_path(path);
        self.check_access(&normalized)?;
        if self.files.read().unwrap().contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(anyhow!("Path not found: {:?}", path))
        }
    }
}
