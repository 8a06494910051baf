//! Session store backends
//!
//! A [`SessionStore`] wraps an injected [`StoreBackend`] trait object. The
//! backend moves raw JSON strings; the typed `get`/`set` wrappers do the
//! serde work so callers never touch payload encoding.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Unique identifier for a stored session
pub type SessionId = String;

/// Errors surfaced by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("Lock poisoned")]
    Poisoned,
}

/// Raw keyed storage for JSON payloads
///
/// Object safe so the daemon can swap a file-backed store for an in-memory
/// one in tests without touching orchestrator code.
pub trait StoreBackend: Send + Sync {
    /// Fetch the raw payload for an id, `None` if absent
    fn get(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Write (or overwrite) the payload for an id
    fn set(&self, id: &str, payload: &str) -> Result<(), StoreError>;

    /// Remove an id, returning whether it existed
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// All stored ids, sorted
    fn list(&self) -> Result<Vec<SessionId>, StoreError>;
}

/// Typed facade over a [`StoreBackend`]
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn StoreBackend>,
}

impl SessionStore {
    /// Open a file-backed store rooted at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            backend: Arc::new(FileStore::open(path)?),
        })
    }

    /// In-memory store for tests and dry runs
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(MemoryStore::new()),
        }
    }

    /// Wrap an externally constructed backend
    pub fn with_backend(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Deserialize the value stored under `id`
    pub fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(id)? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `id`
    pub fn set<T: Serialize>(&self, id: &str, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(value)?;
        self.backend.set(id, &payload)
    }

    /// Raw payload for an id, untouched by serde
    pub fn get_raw(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(id)
    }

    /// Remove an id, returning whether it existed
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.backend.delete(id)
    }

    /// All stored ids, sorted
    pub fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        self.backend.list()
    }
}

/// One JSON file per session under a base directory
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened session store");
        Ok(Self { base_path })
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.json"))
    }

    /// Hold an exclusive advisory lock for the duration of a write
    fn write_lock(&self) -> Result<fs::File, StoreError> {
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(".lock"))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }
}

/// Ids become file names, so anything path-like is rejected
fn validate_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && !id.starts_with('.')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok { Ok(()) } else { Err(StoreError::InvalidId(id.to_string())) }
}

impl StoreBackend for FileStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        validate_id(id)?;
        match fs::read_to_string(self.payload_path(id)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, id: &str, payload: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        // Lock released when the handle drops
        let _lock = self.write_lock()?;

        // Write to a temp file, then rename, so readers never see a torn payload
        let tmp_path = self.base_path.join(format!(".{id}.json.tmp"));
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(payload.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, self.payload_path(id))?;
        debug!(id, bytes = payload.len(), "Persisted session");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        validate_id(id)?;
        let _lock = self.write_lock()?;
        match fs::remove_file(self.payload_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !stem.starts_with('.')
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// HashMap-backed store, used by tests and `--dry-run` style flows
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(id).cloned())
    }

    fn set(&self, id: &str, payload: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(id.to_string(), payload.to_string());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut ids: Vec<String> = entries.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = SessionStore::memory();
        let doc = Doc { name: "nda".into(), count: 3 };

        store.set("a1-session-nda", &doc).unwrap();
        let loaded: Option<Doc> = store.get("a1-session-nda").unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = SessionStore::memory();
        let loaded: Option<Doc> = store.get("nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let doc = Doc { name: "msa".into(), count: 7 };

        store.set("b2-session-msa", &doc).unwrap();
        let loaded: Option<Doc> = store.get("b2-session-msa").unwrap();
        assert_eq!(loaded, Some(doc));

        // Payload lands as pretty JSON in a file named after the id
        let on_disk = dir.path().join("b2-session-msa.json");
        assert!(on_disk.exists());
    }

    #[test]
    fn file_store_list_is_sorted_and_skips_lock() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.set("zz", &1u32).unwrap();
        store.set("aa", &2u32).unwrap();

        assert_eq!(store.list().unwrap(), vec!["aa".to_string(), "zz".to_string()]);
    }

    #[test]
    fn delete_reports_existence() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();

        store.set("gone", &1u32).unwrap();
        assert!(store.delete("gone").unwrap());
        assert!(!store.delete("gone").unwrap());
    }

    #[test]
    fn path_like_ids_are_rejected() {
        let store = SessionStore::memory();
        let err = store.set("../escape", &1u32).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));

        let dir = TempDir::new().unwrap();
        let files = SessionStore::open(dir.path()).unwrap();
        assert!(matches!(files.set("a/b", &1u32), Err(StoreError::InvalidId(_))));
        assert!(matches!(files.set("", &1u32), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn overwrite_replaces_payload() {
        let store = SessionStore::memory();
        store.set("k", &Doc { name: "v1".into(), count: 1 }).unwrap();
        store.set("k", &Doc { name: "v2".into(), count: 2 }).unwrap();

        let loaded: Option<Doc> = store.get("k").unwrap();
        assert_eq!(loaded.unwrap().name, "v2");
    }

    #[test]
    fn raw_payload_matches_typed_write() {
        let store = SessionStore::memory();
        store.set("k", &Doc { name: "raw".into(), count: 9 }).unwrap();

        let raw = store.get_raw("k").unwrap().unwrap();
        let parsed: Doc = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.count, 9);
    }
}
