//! Bearer-token storage.
//!
//! # Design
//! The store is an explicit object injected into `ApiClient`, not a
//! module-level singleton: tests substitute doubles and hosts can scope one
//! session per store. A store holds at most one token; `set` overwrites,
//! `clear` removes and is idempotent. The token is opaque — no expiry or
//! validation happens here.

use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

/// Durable storage for a single bearer token.
pub trait TokenStore: Send + Sync {
    /// The stored token, or `None` if never set (or since cleared).
    fn get(&self) -> Option<String>;

    /// Persist `token`, overwriting any previous value.
    fn set(&self, token: &str);

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self);
}

/// In-memory store for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a usable Option
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}

/// File-backed store: one JSON file holding the token, 0600 on Unix.
///
/// The desktop analog of the browser-local storage slot the web dashboard
/// uses. A missing or unreadable file reads as "no token", so a corrupt
/// file never wedges the client — the next login rewrites it.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ledger/token.json"))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str::<StoredToken>(&contents)
            .ok()
            .map(|stored| stored.token)
    }

    fn set(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!("token store: cannot create {}: {err}", parent.display());
                return;
            }
        }
        let stored = StoredToken {
            token: token.to_string(),
        };
        let contents = match serde_json::to_string(&stored) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("token store: cannot encode token: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, contents) {
            warn!("token store: cannot write {}: {err}", self.path.display());
            return;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            if let Err(err) = std::fs::set_permissions(&self.path, permissions) {
                warn!("token store: cannot set permissions on {}: {err}", self.path.display());
            }
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                warn!("token store: cannot remove {}: {err}", self.path.display());
            }
        }
    }
}
