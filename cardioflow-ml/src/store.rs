//! Key-value artifact store shared by the pipeline stages.
//!
//! Stages never hand data to each other in memory: each one reads named
//! artifacts from a store and writes named artifacts back. The filesystem
//! store writes atomically (write to a `.tmp` sibling, then rename) so a
//! stage that fails mid-write never leaves a partial artifact behind.
//!
//! The store assumes a single writer per key. Concurrent stages writing the
//! same key are not coordinated.

use crate::error::PipelineError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Fixed artifact keys.
pub mod keys {
    /// Raw tabular source read by ingestion.
    pub const SOURCE_DATA: &str = "data/heart.csv";
    /// Declared column schema read by validation.
    pub const SCHEMA: &str = "schema.yaml";
    /// Unmodified copy of the source.
    pub const RAW_SNAPSHOT: &str = "artifacts/heart_raw.csv";
    /// Standardized features followed by the label column.
    pub const TRANSFORMED: &str = "artifacts/heart_transformed.csv";
    /// Fitted predictor.
    pub const MODEL: &str = "artifacts/model.json";
    /// Evaluation metrics.
    pub const METRICS: &str = "artifacts/metrics.json";
}

/// Blob storage addressed by path-like string keys.
pub trait ArtifactStore: Send + Sync {
    /// Read the artifact stored under `key`.
    ///
    /// Returns [`PipelineError::ArtifactMissing`] when nothing is stored there.
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError>;

    /// Store `data` under `key`, replacing any previous artifact.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), PipelineError>;

    /// Whether an artifact is stored under `key`.
    fn exists(&self, key: &str) -> bool;

    /// Human-readable location of `key`, for log messages.
    fn describe(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Store backed by a directory; keys are paths relative to `root`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::artifact_missing(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<(), PipelineError> {
        atomic_write(&self.path_for(key), data)?;
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn describe(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

/// Atomically write raw bytes to a file, creating parent directories.
///
/// The `.tmp` sibling is removed if the write or the rename fails.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    if let Err(e) = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, key: &str, data: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(key.to_string(), data.into());
        }
        self
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .read()
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| std::io::Error::other("artifact store lock poisoned"))?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| PipelineError::artifact_missing(key))
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<(), PipelineError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| std::io::Error::other("artifact store lock poisoned"))?;
        blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.blobs
            .read()
            .map(|b| b.contains_key(key))
            .unwrap_or(false)
    }

    fn describe(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_failed_put_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let target = dir.path().join(keys::MODEL);
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();

        assert!(store.put(keys::MODEL, b"{}").is_err());
        assert!(!dir.path().join("artifacts").join("model.json.tmp").exists());
        assert!(!store.exists(keys::MODEL));
    }

    #[test]
    fn test_fs_put_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.put(keys::RAW_SNAPSHOT, b"a,b\n1,2\n").unwrap();
        assert!(dir.path().join("artifacts").join("heart_raw.csv").exists());
        assert!(store.exists(keys::RAW_SNAPSHOT));
        assert_eq!(store.get(keys::RAW_SNAPSHOT).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_fs_put_is_idempotent_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.put(keys::METRICS, b"first").unwrap();
        store.put(keys::METRICS, b"second").unwrap();
        assert_eq!(store.get(keys::METRICS).unwrap(), b"second");
    }

    #[test]
    fn test_fs_no_tmp_leftover() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.put(keys::METRICS, b"{}").unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("artifacts"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_fs_get_missing() {
        let dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(dir.path());

        let err = store.get(keys::TRANSFORMED).unwrap_err();
        assert!(err.is_missing_artifact());
        assert!(!store.exists(keys::TRANSFORMED));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryArtifactStore::new().with(keys::SCHEMA, "COLUMNS: []");
        assert!(store.exists(keys::SCHEMA));
        assert!(!store.exists(keys::MODEL));

        store.put(keys::MODEL, b"{}").unwrap();
        assert_eq!(store.get(keys::MODEL).unwrap(), b"{}");
        assert_eq!(store.keys(), vec![keys::MODEL.to_string(), keys::SCHEMA.to_string()]);
        assert!(store.get(keys::METRICS).unwrap_err().is_missing_artifact());
    }
}
