use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub name: String,
    pub is_dir: bool,
}

impl StoreEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMetadata {
    pub size: u64,
    pub is_dir: bool,
}

/// Read-only view of the shared asset store.
///
/// Paths are `/`-separated and relative to the store root; the empty string
/// names the root itself. Implementations must never mutate the store.
pub trait AssetStore: Send + Sync {
    fn list_dir(&self, rel_path: &str) -> io::Result<Vec<StoreEntry>>;

    fn stat(&self, rel_path: &str) -> io::Result<StoreMetadata>;

    fn exists(&self, rel_path: &str) -> bool {
        self.stat(rel_path).is_ok()
    }
}

/// Asset store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Maps a store-relative path onto the host filesystem, refusing anything
    /// that could escape the root.
    fn resolve(&self, rel_path: &str) -> io::Result<PathBuf> {
        let rel_path = rel_path.replace('\\', "/");
        let rel = Path::new(rel_path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in rel.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path '{rel_path}' escapes the asset root"),
                    ));
                }
            }
        }
        Ok(resolved)
    }
}

impl AssetStore for FsStore {
    fn list_dir(&self, rel_path: &str) -> io::Result<Vec<StoreEntry>> {
        let dir = self.resolve(rel_path)?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry in {}: {e}", dir.display());
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.is_empty() {
                continue;
            }
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    log::debug!("Skipping '{name}' in {}: {e}", dir.display());
                    continue;
                }
            };
            // Symlinks are skipped, never followed.
            if file_type.is_symlink() {
                log::debug!("Skipping symlink '{name}' in {}", dir.display());
                continue;
            }
            entries.push(StoreEntry {
                name,
                is_dir: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    fn stat(&self, rel_path: &str) -> io::Result<StoreMetadata> {
        let meta = fs::metadata(self.resolve(rel_path)?)?;
        Ok(StoreMetadata {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }
}

/// Joins two store-relative paths with a single `/`.
pub fn join_rel(base: &str, rel: &str) -> String {
    let base = base.trim_matches('/');
    let rel = rel.trim_matches('/');
    match (base.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{rel}"),
    }
}
