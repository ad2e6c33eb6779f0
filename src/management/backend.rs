use std::{
    collections::{BTreeMap, HashMap},
    ffi::OsString,
    path::PathBuf,
    sync::Mutex,
};

use async_trait::async_trait;
use tracing::warn;

use crate::{config, error::StoreError};

/// Raw key/value persistence behind the [`TokenStore`](super::TokenStore).
///
/// Values arrive already JSON-serialized; a backend only keeps strings.
/// A batch handed to [`apply`](StorageBackend::apply) is persisted as a whole
/// or not at all.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Saves (`Some`) or removes (`None`) every entry of `changes` in one step.
    async fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError>;

    async fn save(&self, key: &str, raw: &str) -> Result<(), StoreError> {
        self.apply(&[(key, Some(raw))]).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.apply(&[(key, None)]).await
    }
}

/// Process-scoped storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, raw) in changes {
            match raw {
                Some(raw) => entries.insert(key.to_string(), raw.to_string()),
                None => entries.remove(*key),
            };
        }
        Ok(())
    }
}

/// A single JSON object file mapping key names to serialized entries.
///
/// The file is replaced through a sibling `.tmp` file and a rename, so a
/// reader sees either the old or the new content. A file that cannot be
/// parsed is treated as empty, the next write replaces it.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `tokens.json` in the application's cache directory.
    pub fn default_location() -> Self {
        Self::new(config::data_dir().join("cache/tokens.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "token file is unreadable, starting empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let temp = self.temp_path();
        async_fs::write(&temp, json).await?;
        async_fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let mut entries = self.read_all().await?;
        let mut changed = false;

        for (key, raw) in changes {
            changed |= match raw {
                Some(raw) => {
                    entries.insert(key.to_string(), raw.to_string()).as_deref() != Some(*raw)
                }
                None => entries.remove(*key).is_some(),
            };
        }

        if changed {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}
