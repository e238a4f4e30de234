//! Bearer token storage
//!
//! Tokens carry an absolute expiry. Reading an expired token clears it, so
//! callers never see a credential the backend would reject as stale.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::FlashgenError;

const CONFIG_DIR: &str = "flashgen";
const CREDENTIALS_FILE: &str = "credentials.toml";

/// Source of the bearer credential attached to API requests
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when missing or expired
    fn token(&self) -> Option<String>;

    /// Forget the token (logout, or the backend rejected it)
    fn clear(&self);
}

/// A token together with its expiry, in milliseconds since the Unix epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at_ms: i64,
}

impl StoredToken {
    /// Build a token that expires `expires_in_secs` from now
    ///
    /// Saturates on out-of-range lifetimes from the server.
    pub fn expiring_in(access_token: String, expires_in_secs: i64) -> Self {
        let lifetime_ms = expires_in_secs.saturating_mul(1000);
        Self {
            access_token,
            expires_at_ms: Utc::now().timestamp_millis().saturating_add(lifetime_ms),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }
}

/// In-memory token store with expiry
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stored(stored: Option<StoredToken>) -> Self {
        Self {
            inner: RwLock::new(stored),
        }
    }

    /// Store a token that expires `expires_in_secs` from now
    pub fn set_token(&self, token: String, expires_in_secs: i64) {
        self.set_stored(StoredToken::expiring_in(token, expires_in_secs));
    }

    pub fn set_stored(&self, stored: StoredToken) {
        *self.inner.write() = Some(stored);
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        match self.inner.read().as_ref() {
            None => return None,
            Some(stored) if !stored.is_expired() => return Some(stored.access_token.clone()),
            Some(_) => {}
        }

        log::debug!("Stored token expired, clearing it");
        self.clear();
        None
    }

    fn clear(&self) {
        *self.inner.write() = None;
    }
}

/// Fixed token from configuration or environment, never expires locally
#[derive(Debug)]
pub struct StaticTokenStore {
    token: RwLock<Option<String>>,
}

impl StaticTokenStore {
    pub fn new(token: String) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl TokenStore for StaticTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}

/// Token store persisted to a TOML credentials file
///
/// The file is read once on open; `set_token` and `clear` write through.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    memory: MemoryTokenStore,
}

/// Default credentials location: `~/.config/flashgen/credentials.toml`
pub fn credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| {
        p.join(".config")
            .join(CONFIG_DIR)
            .join(CREDENTIALS_FILE)
    })
}

impl FileTokenStore {
    /// Open the store at `path`, loading any token already saved there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = load_credentials(&path);
        Self {
            path,
            memory: MemoryTokenStore::from_stored(stored),
        }
    }

    /// Store a token and persist it
    pub fn set_token(&self, token: String, expires_in_secs: i64) -> Result<(), FlashgenError> {
        let stored = StoredToken::expiring_in(token, expires_in_secs);
        save_credentials(&self.path, &stored)?;
        self.memory.set_stored(stored);
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let token = self.memory.token();
        if token.is_none() && self.path.exists() {
            remove_credentials(&self.path);
        }
        token
    }

    fn clear(&self) {
        self.memory.clear();
        remove_credentials(&self.path);
    }
}

fn load_credentials(path: &Path) -> Option<StoredToken> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<StoredToken>(&contents) {
        Ok(stored) => Some(stored),
        Err(e) => {
            log::warn!("Ignoring malformed credentials file {}: {}", path.display(), e);
            None
        }
    }
}

fn save_credentials(path: &Path, stored: &StoredToken) -> Result<(), FlashgenError> {
    let contents =
        toml::to_string(stored).map_err(|e| FlashgenError::Credentials(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn remove_credentials(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        log::warn!("Failed to remove credentials file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
#[path = "token_store_tests.rs"]
mod token_store_tests;
