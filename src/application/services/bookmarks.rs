//! Per-user message bookmarks persisted through the key-value store

use std::sync::Arc;

use crate::application::errors::StorageError;
use crate::domain::entities::Bookmark;
use crate::domain::traits::KeyValueStore;

fn user_key(user_id: &str) -> String {
    format!("bookmarks:{}", user_id)
}

/// Service for saving and recalling bookmarked messages.
pub struct BookmarkService {
    store: Arc<dyn KeyValueStore>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        match self.store.get(&user_key(user_id)).await? {
            Some(blob) => serde_json::from_str(&blob)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, user_id: &str, bookmarks: &[Bookmark]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(bookmarks)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&user_key(user_id), &blob).await
    }

    pub async fn add(&self, bookmark: Bookmark) -> Result<(), StorageError> {
        let mut bookmarks = self.load(&bookmark.user_id).await?;
        let user_id = bookmark.user_id.clone();
        bookmarks.push(bookmark);
        self.persist(&user_id, &bookmarks).await
    }

    /// List a user's bookmarks, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        let mut bookmarks = self.load(user_id).await?;
        bookmarks.reverse();
        Ok(bookmarks)
    }

    /// Remove one bookmark by id. Returns whether anything was removed.
    pub async fn remove(&self, user_id: &str, bookmark_id: &str) -> Result<bool, StorageError> {
        let mut bookmarks = self.load(user_id).await?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != bookmark_id);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.persist(user_id, &bookmarks).await?;
        Ok(true)
    }

    pub async fn clear(&self, user_id: &str) -> Result<(), StorageError> {
        self.store.delete(&user_key(user_id)).await
    }
}
