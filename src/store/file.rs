use crate::error::app_error::AppError;
use crate::store::{KeyValueStore, StorageKey};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Session values kept as one JSON object on disk.
///
/// Every `set` rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous contents in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

type Entries = BTreeMap<String, String>;

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_entries(&self) -> Result<Entries, AppError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(AppError::storage(format!("Failed to read {}", self.path.display()), e)),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| AppError::serialization(format!("Corrupt session file {}", self.path.display()), e))
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("Failed to create {}", parent.display()), e))?;
        }

        let body = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}", tmp_path.display()), e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to replace {}", self.path.display()), e))?;

        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.as_str().to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn get(&self, key: StorageKey) -> Result<Option<String>, AppError> {
        let entries = self.read_entries().await?;
        Ok(entries.get(key.as_str()).cloned())
    }

    async fn remove_all(&self, keys: &[StorageKey]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        for key in keys {
            entries.remove(key.as_str());
        }
        if entries.len() == before {
            return Ok(());
        }
        self.write_entries(&entries).await
    }

    async fn replace_all(&self, replacement: &[(StorageKey, String)]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        for key in StorageKey::ALL {
            entries.remove(key.as_str());
        }
        for (key, value) in replacement {
            entries.insert(key.as_str().to_string(), value.clone());
        }
        self.write_entries(&entries).await
    }
}
