//! Session token persistence
//!
//! The browser original kept the token in local storage; here it lives as a
//! small JSON file under the platform data directory.

use crate::core::error::{RailError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Where the client keeps its session token between runs
pub trait SessionStore: Send + Sync {
    /// Read the persisted token, if any
    fn load(&self) -> Result<Option<String>>;

    /// Persist a token, replacing any previous one
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the persisted token; a no-op when none exists
    fn clear(&self) -> Result<()>;
}

/// JSON file in the platform data directory
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| RailError::ConfigError("Cannot determine data directory".to_string()))?;
        Ok(Self::with_path(data_dir.join("railbook").join("session.json")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RailError::IoError(e)),
        };

        // A corrupt file is the same as no session
        match serde_json::from_str::<StoredSession>(&data) {
            Ok(session) => Ok(Some(session.token)),
            Err(_) => Ok(None),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(RailError::IoError)?;
        }
        let data = serde_json::to_string_pretty(&StoredSession {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, data).map_err(RailError::IoError)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RailError::IoError(e)),
        }
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());

        store.save("token-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-1"));

        store.save("token-2").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-2"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing again is a no-op
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("a").join("b").join("session.json"));
        store.save("tok").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_corrupt_file_reads_as_no_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileSessionStore::with_path(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::default();
        assert!(store.load().unwrap().is_none());
        store.save("tok").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok"));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
