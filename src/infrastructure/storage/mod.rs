//! File-backed key-value storage implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::KeyValueStore;

/// JSON file-backed store: the whole key space lives in one file that is
/// rewritten on every mutation. Small data, simple recovery.
pub struct JsonFileStore {
    path: PathBuf,
    kv: Arc<RwLock<HashMap<String, String>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kv: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Read the backing file into memory. A missing file is an empty store.
    pub async fn init(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let map: HashMap<String, String> = serde_json::from_str(&content)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                *self.kv.write().await = map;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let kv = self.kv.read().await;
        let content = serde_json::to_string_pretty(&*kv)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let kv = self.kv.read().await;
        Ok(kv.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut kv = self.kv.write().await;
            kv.insert(key.to_string(), value.to_string());
        }
        self.flush().await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        {
            let mut kv = self.kv.write().await;
            kv.remove(key);
        }
        self.flush().await
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    kv: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let kv = self.kv.read().await;
        Ok(kv.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        kv.remove(key);
        Ok(())
    }
}
