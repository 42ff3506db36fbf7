//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{BlobStore, StorageError};

/// In-memory blob storage. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().unwrap().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upsert(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().unwrap().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_then_get_round_trips() {
        let store = MemoryStore::new();
        store.upsert("user-1", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get("user-1").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[tokio::test]
    async fn test_upsert_twice_same_blob_is_idempotent() {
        let store = MemoryStore::new();
        store.upsert("user-1", r#"{"a":1}"#).await.unwrap();
        store.upsert("user-1", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get("user-1").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_prior_blob() {
        let store = MemoryStore::new();
        store.upsert("user-1", r#"{"a":1}"#).await.unwrap();
        store.upsert("user-1", r#"{"a":2}"#).await.unwrap();
        assert_eq!(
            store.get("user-1").await.unwrap().as_deref(),
            Some(r#"{"a":2}"#)
        );
    }
}
