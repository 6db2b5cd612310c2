use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::migrate::board_from_value;
use crate::io::store::{DocumentStore, StoreError};
use crate::model::board::{Board, DEFAULT_COLUMN};
use crate::model::config::AppConfig;

/// Document key of the user's inbox board
pub const INBOX_KEY: &str = "inbox";
/// Document key of the project group list
pub const WORKSPACE_KEY: &str = "workspace";
/// Document key of the tag catalog
pub const TAGS_KEY: &str = "tags";

const PROJECT_KEY_PREFIX: &str = "project-";

/// Document key of a project's board
pub fn project_key(project_id: &str) -> String {
    format!("{}{}", PROJECT_KEY_PREFIX, project_id)
}

/// Loads and saves boards and side documents through a [`DocumentStore`].
///
/// Remembers the version each document was loaded at, so a save made from a
/// stale copy is refused instead of silently overwriting a newer one.
pub struct BoardRepository<S> {
    store: S,
    versions: HashMap<String, u64>,
    check_versions: bool,
    default_column: String,
}

impl<S: DocumentStore> BoardRepository<S> {
    pub fn new(store: S) -> Self {
        BoardRepository {
            store,
            versions: HashMap::new(),
            check_versions: true,
            default_column: DEFAULT_COLUMN.to_string(),
        }
    }

    pub fn with_config(store: S, config: &AppConfig) -> Self {
        BoardRepository {
            check_versions: config.store.check_versions,
            default_column: config.inbox.default_column.clone(),
            ..BoardRepository::new(store)
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Version this repository last saw for `key` (0 if never loaded)
    pub fn version(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    /// Keys of every board document: the inbox first, then each stored
    /// project board in key order.
    pub fn board_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = vec![INBOX_KEY.to_string()];
        keys.extend(
            self.store
                .keys()?
                .into_iter()
                .filter(|k| k.starts_with(PROJECT_KEY_PREFIX)),
        );
        Ok(keys)
    }

    /// Load a board, upgrading older formats. A missing document yields a
    /// board holding just the default column; so does one with no columns.
    pub fn load(&mut self, key: &str) -> Result<Board, StoreError> {
        let Some(doc) = self.store.read(key)? else {
            self.versions.insert(key.to_string(), 0);
            return Ok(Board::with_default_column(&self.default_column));
        };
        let mut board = board_from_value(doc.data).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        if board.ensure_default_column(&self.default_column) {
            tracing::debug!(key, "board had no columns; default column added");
        }
        self.versions.insert(key.to_string(), doc.version);
        Ok(board)
    }

    /// Persist the whole board, replacing the stored document.
    pub fn save(&mut self, key: &str, board: &Board) -> Result<u64, StoreError> {
        let value = serde_json::to_value(board).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        self.write(key, value)
    }

    /// Save without surfacing failure. The caller keeps its in-memory board
    /// either way; a failed write is logged and reported as `false`.
    pub fn persist(&mut self, key: &str, board: &Board) -> bool {
        match self.save(key, board) {
            Ok(version) => {
                tracing::debug!(key, version, "board saved");
                true
            }
            Err(e) => {
                tracing::error!(key, error = %e, "failed to save board");
                false
            }
        }
    }

    /// Load a non-board document, or its default when absent.
    pub fn load_document<T: DeserializeOwned + Default>(&mut self, key: &str) -> Result<T, StoreError> {
        let Some(doc) = self.store.read(key)? else {
            self.versions.insert(key.to_string(), 0);
            return Ok(T::default());
        };
        let value = serde_json::from_value(doc.data).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        self.versions.insert(key.to_string(), doc.version);
        Ok(value)
    }

    pub fn save_document<T: Serialize>(&mut self, key: &str, value: &T) -> Result<u64, StoreError> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Json {
            key: key.to_string(),
            source: e,
        })?;
        self.write(key, value)
    }

    fn write(&mut self, key: &str, value: serde_json::Value) -> Result<u64, StoreError> {
        let expected = if self.check_versions {
            Some(self.version(key))
        } else {
            None
        };
        let version = self.store.write(key, value, expected)?;
        self.versions.insert(key.to_string(), version);
        Ok(version)
    }
}
