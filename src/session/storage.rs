use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// Where the bearer token survives between runs
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    saved_at: DateTime<Utc>,
}

/// `session.json` inside the console's config directory
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read()?.map(|s| s.saved_at))
    }

    fn read(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let stored: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(stored))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.read()?.map(|s| s.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        let stored = StoredSession {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Process-local storage, for tests and one-shot embedding
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().ok().and_then(|t| t.clone()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::in_dir(dir.path());

        assert_eq!(storage.load().unwrap(), None);
        storage.save("abc.def").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def"));
        assert!(storage.saved_at().unwrap().is_some());

        storage.clear().unwrap();
        assert!(!storage.path().exists());
        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn memory_storage() {
        let storage = MemoryTokenStorage::with_token("t");
        assert_eq!(storage.load().unwrap().as_deref(), Some("t"));
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
