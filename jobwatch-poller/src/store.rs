//! Pause persistence
//!
//! A narrow key-value store contract plus the adapter pollers use to
//! remember the operator's pause intent across restarts. The adapter never
//! fails: when storage is unavailable pause/resume degrade to in-memory
//! behaviour.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store shared by every poller in the process
///
/// Implementations must be safe for concurrent use; pollers use distinct
/// keys.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk
///
/// The whole file is rewritten on every `set_item`. A missing file reads as
/// empty; an unreadable one is replaced on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<config dir>/jobwatch/state.json`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jobwatch").join("state.json"))
    }

    fn read_items(&self) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.read_items()?;
        Ok(items.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;

        let mut items = match self.read_items() {
            Ok(items) => items,
            Err(StorageError::Serialization(e)) => {
                warn!("Replacing unreadable state file {}: {}", self.path.display(), e);
                Default::default()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), serde_json::Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&items)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Adapter persisting a poller's pause flag
///
/// Never fails. Storage errors are logged and treated as "not paused" on
/// load and as a no-op on save.
#[derive(Clone)]
pub struct PauseStore {
    store: Arc<dyn KeyValueStore>,
}

impl PauseStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// In-memory pause persistence, for callers without durable storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Reads the persisted pause flag, defaulting to `false`
    pub fn load(&self, key: &str) -> bool {
        match self.store.get_item(key) {
            Ok(Some(raw)) => match serde_json::from_str::<bool>(&raw) {
                Ok(paused) => paused,
                Err(e) => {
                    warn!("Ignoring corrupt pause flag for {}: {}", key, e);
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to load pause flag for {}: {}", key, e);
                false
            }
        }
    }

    /// Persists the pause flag, swallowing storage failures
    pub fn save(&self, key: &str, paused: bool) {
        let raw = if paused { "true" } else { "false" };
        match self.store.set_item(key, raw) {
            Ok(()) => debug!("Persisted pause flag {}={}", key, paused),
            Err(e) => warn!("Failed to persist pause flag for {}: {}", key, e),
        }
    }
}

impl std::fmt::Debug for PauseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PauseStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Store that fails every call
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_pause_flag_round_trip_in_memory() {
        let store = PauseStore::in_memory();
        assert!(!store.load("dashboard"));

        store.save("dashboard", true);
        assert!(store.load("dashboard"));
        assert!(!store.load("job-42"));

        store.save("dashboard", false);
        assert!(!store.load("dashboard"));
    }

    #[test]
    fn test_corrupt_value_reads_as_not_paused() {
        let memory = Arc::new(MemoryStore::new());
        memory.set_item("dashboard", "{not json").unwrap();

        let store = PauseStore::new(memory);
        assert!(!store.load("dashboard"));
    }

    #[test]
    fn test_broken_store_never_fails() {
        let store = PauseStore::new(Arc::new(BrokenStore));
        store.save("dashboard", true);
        assert!(!store.load("dashboard"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get_item("dashboard").unwrap(), None);
        store.set_item("dashboard", "true").unwrap();
        store.set_item("job-1", "false").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get_item("dashboard").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get_item("job-1").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_file_store_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get_item("dashboard"),
            Err(StorageError::Serialization(_))
        ));
        assert!(!PauseStore::new(Arc::new(FileStore::new(&path))).load("dashboard"));

        store.set_item("dashboard", "true").unwrap();
        assert_eq!(store.get_item("dashboard").unwrap().as_deref(), Some("true"));
    }
}
