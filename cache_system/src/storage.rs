//! Persistence backends
//!
//! A backend stores one opaque JSON blob per storage key. The cache
//! serializes its whole contents into that blob on every mutation.

use crate::errors::CacheError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Key-value store holding serialized caches
pub trait StorageBackend: Send + Sync + Debug {
    /// Read the blob stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replace the blob stored under `key`
    fn save(&self, key: &str, blob: &str) -> Result<(), CacheError>;

    /// Remove the blob stored under `key`
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process storage. Clones share the same underlying map, so a cache
/// rebuilt with a clone sees what the previous instance persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the storage shared by the whole process
    pub fn process() -> Self {
        static PROCESS: OnceLock<MemoryStorage> = OnceLock::new();
        PROCESS.get_or_init(MemoryStorage::new).clone()
    }

    /// Reject writes whose blob exceeds `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            blobs: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CacheError> {
        if let Some(quota) = self.quota_bytes {
            if blob.len() > quota {
                return Err(CacheError::QuotaExceeded {
                    key: key.to_string(),
                    size: blob.len(),
                });
            }
        }
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(key);
        Ok(())
    }
}

/// One JSON file per storage key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create the storage, creating `dir` if it does not exist
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shared_between_clones() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();

        storage.save("k", "{}").unwrap();
        assert_eq!(clone.load("k").unwrap().as_deref(), Some("{}"));

        clone.remove("k").unwrap();
        assert!(!storage.contains("k"));
    }

    #[test]
    fn test_process_storage_is_shared() {
        MemoryStorage::process().save("process-shared", "[]").unwrap();
        assert!(MemoryStorage::process().contains("process-shared"));
        assert!(!MemoryStorage::new().contains("process-shared"));
        MemoryStorage::process().remove("process-shared").unwrap();
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(4);
        assert!(storage.save("k", "1234").is_ok());
        assert!(matches!(
            storage.save("k", "12345"),
            Err(CacheError::QuotaExceeded { size: 5, .. })
        ));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();

        assert_eq!(storage.load("route/cache").unwrap(), None);
        storage.save("route/cache", "[1,2]").unwrap();
        assert_eq!(storage.load("route/cache").unwrap().as_deref(), Some("[1,2]"));
        assert!(storage.dir().join("route_cache.json").exists());

        storage.remove("route/cache").unwrap();
        storage.remove("route/cache").unwrap();
        assert_eq!(storage.load("route/cache").unwrap(), None);
    }
}
