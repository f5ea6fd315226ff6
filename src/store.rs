//! Client-side persistent state: auth token plus liked and bookmarked ids.
//!
//! Call sites go through [`ClientState`]; the raw key-value primitives live
//! behind [`KeyValueStore`] so tests can swap in [`MemoryStore`]. Writers are
//! not coordinated, the last write wins.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{models::ArticleId, storage, storage::StorageError};

pub const TOKEN_KEY: &str = "token";
pub const LIKED_KEY: &str = "likedNews";
pub const BOOKMARKED_KEY: &str = "bookmarkedNews";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// JSON document on disk, rewritten on every change.
///
/// With a passphrase the document is sealed via [`storage::seal_base64`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    passphrase: Option<String>,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(
        path: impl Into<PathBuf>,
        passphrase: Option<String>,
    ) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let json = match &passphrase {
                Some(passphrase) => {
                    let bytes = storage::open_base64(&text, passphrase)?;
                    String::from_utf8(bytes)
                        .map_err(|e| StorageError::InvalidFormat(e.to_string()))?
                }
                None => text,
            };
            serde_json::from_str(&json)?
        } else {
            debug!("No state file at {:?}, starting empty", path);
            HashMap::new()
        };

        Ok(Self {
            path,
            passphrase,
            entries: RwLock::new(entries),
        })
    }

    /// `<config dir>/newsdesk/state.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("newsdesk").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        let contents = match &self.passphrase {
            Some(passphrase) => storage::seal_base64(json.as_bytes(), passphrase)?,
            None => json,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)?;

        // Owner read/write only, the file holds the auth token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        debug!("State saved to {:?}", self.path);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Typed access to the persisted client state.
#[derive(Clone)]
pub struct ClientState {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ClientState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: Option<String>) -> Result<(), StorageError> {
        match token {
            Some(token) => {
                info!("Auth token stored");
                self.store.set(TOKEN_KEY, token)
            }
            None => {
                info!("Auth token cleared");
                self.store.remove(TOKEN_KEY)
            }
        }
    }

    pub fn liked_ids(&self) -> Vec<Value> {
        self.ids(LIKED_KEY)
    }

    pub fn is_liked(&self, id: &ArticleId) -> bool {
        self.contains(LIKED_KEY, id)
    }

    pub fn set_liked(&self, id: &ArticleId, liked: bool) {
        self.set_flag(LIKED_KEY, id, liked);
    }

    pub fn bookmarked_ids(&self) -> Vec<Value> {
        self.ids(BOOKMARKED_KEY)
    }

    pub fn is_bookmarked(&self, id: &ArticleId) -> bool {
        self.contains(BOOKMARKED_KEY, id)
    }

    pub fn set_bookmarked(&self, id: &ArticleId, bookmarked: bool) {
        self.set_flag(BOOKMARKED_KEY, id, bookmarked);
    }

    /// Flips the bookmark flag and returns the new value.
    pub fn toggle_bookmark(&self, id: &ArticleId) -> bool {
        let bookmarked = !self.is_bookmarked(id);
        self.set_bookmarked(id, bookmarked);
        bookmarked
    }

    fn ids(&self, key: &str) -> Vec<Value> {
        let Some(raw) = self.store.get(key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, "Stored id list is not a JSON array, ignoring it: {e}");
            Vec::new()
        })
    }

    fn contains(&self, key: &str, id: &ArticleId) -> bool {
        self.ids(key).iter().any(|v| id.matches(v))
    }

    fn set_flag(&self, key: &str, id: &ArticleId, on: bool) {
        let mut ids = self.ids(key);
        ids.retain(|v| !id.matches(v));
        if on {
            match serde_json::to_value(id) {
                Ok(value) => ids.push(value),
                Err(e) => {
                    warn!(key, %id, "Failed to encode id: {e}");
                    return;
                }
            }
        }

        let result = serde_json::to_string(&ids)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.set(key, raw));
        if let Err(e) = result {
            warn!(key, %id, "Failed to persist flag: {e}");
        }
    }
}
