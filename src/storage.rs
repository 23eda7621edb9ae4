use crate::errors::StoreError;
use crate::models::StudyData;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Key under which the whole mapping is kept in the backend.
pub const STORAGE_KEY: &str = "study-calendar-data";

/// What the day-record store needs from persistence.
///
/// `load` returns `Ok(None)` when nothing has been saved yet, which is
/// distinct from a document that exists but cannot be read.
pub trait StudyStorage: Send + Sync {
    fn load(&self) -> Result<Option<StudyData>, StoreError>;
    fn save(&self, data: &StudyData) -> Result<(), StoreError>;
}

/// A string key-value store, the shape of browser local storage.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Keeps each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

/// In-process backend. Reads and writes can be made to fail on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let backend = Self::default();
        lock(&backend.values).insert(key.to_string(), value.to_string());
        backend
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::other("storage unavailable"));
        }
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("storage quota exceeded"));
        }
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Stores the mapping as one JSON document under [`STORAGE_KEY`].
#[derive(Debug, Clone)]
pub struct KeyValueStorage<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueBackend> KeyValueStorage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            key: STORAGE_KEY.to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: KeyValueBackend> StudyStorage for KeyValueStorage<B> {
    fn load(&self) -> Result<Option<StudyData>, StoreError> {
        let Some(raw) = self
            .backend
            .get(&self.key)
            .map_err(|err| StoreError::StorageRead(err.to_string()))?
        else {
            return Ok(None);
        };
        let data =
            decode_snapshot(&raw).map_err(|err| StoreError::StorageRead(err.to_string()))?;
        debug!(days = data.days.len(), "loaded study data");
        Ok(Some(data))
    }

    fn save(&self, data: &StudyData) -> Result<(), StoreError> {
        let payload = encode_snapshot(data)?;
        self.backend
            .set(&self.key, &payload)
            .map_err(|err| StoreError::StorageWrite(err.to_string()))
    }
}

pub fn file_storage(dir: &Path) -> KeyValueStorage<FileBackend> {
    KeyValueStorage::new(FileBackend::new(dir))
}

/// Pretty-printed JSON, shared by persistence and export.
pub fn encode_snapshot(data: &StudyData) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parses a whole mapping and realigns timer flags. Shared by load and import.
pub fn decode_snapshot(text: &str) -> Result<StudyData, serde_json::Error> {
    let mut data: StudyData = serde_json::from_str(text)?;
    data.normalize();
    Ok(data)
}
