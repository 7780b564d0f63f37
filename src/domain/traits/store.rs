use async_trait::async_trait;
use crate::application::errors::StorageError;

/// KeyValueStore trait - abstraction for durable blob persistence
///
/// The tracker serializes its whole per-guild map as one value under a
/// fixed key; implementations only need get/set/delete semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
