use crate::error::app_error::AppError;
use crate::store::{KeyValueStore, StorageKey};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<StorageKey, String> {
        self.values.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), AppError> {
        self.values.lock().await.insert(key, value.to_string());
        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().await.get(&key).cloned())
    }

    async fn remove_all(&self, keys: &[StorageKey]) -> Result<(), AppError> {
        let mut values = self.values.lock().await;
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }

    async fn replace_all(&self, entries: &[(StorageKey, String)]) -> Result<(), AppError> {
        let mut values = self.values.lock().await;
        values.clear();
        values.extend(entries.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryStore::new();
        store.set(StorageKey::Token, "T").await.unwrap();
        store.set(StorageKey::Role, "buyer").await.unwrap();
        assert_eq!(store.get(StorageKey::Token).await.unwrap().as_deref(), Some("T"));

        store.remove_all(&[StorageKey::Token]).await.unwrap();
        assert!(store.get(StorageKey::Token).await.unwrap().is_none());
        assert_eq!(store.get(StorageKey::Role).await.unwrap().as_deref(), Some("buyer"));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryStore::new();
        store.set(StorageKey::UserId, "U1").await.unwrap();
        store.set(StorageKey::UserId, "U2").await.unwrap();
        assert_eq!(store.get(StorageKey::UserId).await.unwrap().as_deref(), Some("U2"));
    }
}
