//! Key-value storage for view state that must survive a reload.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// String values by key, like browser local storage.
pub trait LayoutStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage. Lost on exit.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file, rewritten on every change.
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring corrupt layout storage {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read layout storage {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        info!(
            "Layout storage opened: {} keys, path={}",
            values.len(),
            path.display()
        );
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl LayoutStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let s = MemoryStorage::new();
        assert_eq!(s.get("k"), None);
        s.set("k", "v".into()).unwrap();
        assert_eq!(s.get("k").as_deref(), Some("v"));
        s.remove("k").unwrap();
        assert_eq!(s.get("k"), None);
    }

    #[test]
    fn test_file_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view").join("layout.json");

        let s = FileStorage::open(&path);
        s.set("zoomTransform", "{\"x\":1,\"y\":2,\"k\":1.5}".into())
            .unwrap();
        drop(s);

        let reopened = FileStorage::open(&path);
        assert_eq!(
            reopened.get("zoomTransform").as_deref(),
            Some("{\"x\":1,\"y\":2,\"k\":1.5}")
        );
        reopened.remove("zoomTransform").unwrap();
        assert_eq!(FileStorage::open(&path).get("zoomTransform"), None);
    }

    #[test]
    fn test_file_storage_corrupt_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "not json").unwrap();
        let s = FileStorage::open(&path);
        assert_eq!(s.get("nodePositions"), None);
        s.set("a", "b".into()).unwrap();
        assert_eq!(FileStorage::open(&path).get("a").as_deref(), Some("b"));
    }
}
