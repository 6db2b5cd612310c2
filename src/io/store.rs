use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, LockError, StoreLock};

/// Error type for the document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed document {key}: {source}")]
    Json {
        key: String,
        source: serde_json::Error,
    },
    #[error("stale write to {key}: expected version {expected}, store has {found}")]
    VersionConflict { key: String, expected: u64, found: u64 },
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A stored JSON document with its write counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedDocument {
    pub version: u64,
    pub data: serde_json::Value,
}

/// A key-value document store. Writes replace a document wholesale.
pub trait DocumentStore {
    fn read(&self, key: &str) -> Result<Option<VersionedDocument>, StoreError>;

    /// Replace the document under `key` and return its new version.
    ///
    /// With `expected_version` set, the write is refused unless the stored
    /// version still matches (a missing document has version 0).
    fn write(
        &mut self,
        key: &str,
        data: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// Remove a document. Returns true if it existed.
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

fn check_version(key: &str, expected: Option<u64>, found: u64) -> Result<(), StoreError> {
    match expected {
        Some(expected) if expected != found => Err(StoreError::VersionConflict {
            key: key.to_string(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// One `<key>.json` file per document under a root directory.
///
/// Writes and deletes hold the directory's [`StoreLock`], so the version
/// check and the rename happen as one step across processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore {
            root: root.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        Ok(StoreLock::acquire(&self.root, self.lock_timeout)?)
    }

    fn read_envelope(&self, key: &str) -> Result<Option<VersionedDocument>, StoreError> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        Ok(Some(unwrap_envelope(value)))
    }
}

/// Escape a key into a file stem: `[A-Za-z0-9-]` stay, every other byte
/// becomes `_XX` (uppercase hex), so distinct keys never share a file.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("_{:02X}", b));
        }
    }
    out
}

/// Inverse of [`encode_key`]; `None` for stems this store did not write.
fn decode_key(stem: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut rest = stem.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'_' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

/// Files written before versioning hold the bare document; read those as version 0.
fn unwrap_envelope(value: serde_json::Value) -> VersionedDocument {
    let is_envelope = value.as_object().is_some_and(|map| {
        map.len() == 2 && map.get("version").is_some_and(|v| v.is_u64()) && map.contains_key("data")
    });
    if is_envelope {
        if let Ok(doc) = serde_json::from_value::<VersionedDocument>(value.clone()) {
            return doc;
        }
    }
    VersionedDocument {
        version: 0,
        data: value,
    }
}

impl DocumentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<VersionedDocument>, StoreError> {
        self.read_envelope(key)
    }

    fn write(
        &mut self,
        key: &str,
        data: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let _lock = self.lock()?;
        let found = self.read_envelope(key)?.map_or(0, |d| d.version);
        check_version(key, expected_version, found)?;

        let doc = VersionedDocument {
            version: found + 1,
            data,
        };
        let content = serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        let path = self.path_for(key);
        atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::Io { path, source: e })?;
        Ok(doc.version)
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let _lock = self.lock()?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source: e,
                });
            }
        };
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::Io {
                    path: self.root.clone(),
                    source: e,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Write via a temp file in the same directory, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Memory store
// ---------------------------------------------------------------------------

/// In-process store. Can be told to fail writes to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: HashMap<String, VersionedDocument>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Seed a raw document (e.g. a legacy one) at version 0
    pub fn insert_raw(&mut self, key: &str, data: serde_json::Value) {
        self.docs
            .insert(key.to_string(), VersionedDocument { version: 0, data });
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<VersionedDocument>, StoreError> {
        Ok(self.docs.get(key).cloned())
    }

    fn write(
        &mut self,
        key: &str,
        data: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable(format!("write to {} rejected", key)));
        }
        let found = self.docs.get(key).map_or(0, |d| d.version);
        check_version(key, expected_version, found)?;
        let version = found + 1;
        self.docs
            .insert(key.to_string(), VersionedDocument { version, data });
        Ok(version)
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.docs.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.docs.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
