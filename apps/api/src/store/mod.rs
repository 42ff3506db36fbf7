//! Key-value persistence over opaque serialized blobs.
//!
//! Backends:
//! - `DynamoTable` - one DynamoDB table per collection (production)
//! - `MemoryStore` - in-memory storage for tests and development

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoTable;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("stored item for '{0}' is missing its data attribute")]
    Corrupt(String),
}

/// Put/update/get of opaque JSON blobs keyed by a single partition key.
/// Each `upsert` for a key replaces whatever blob was stored before it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upsert(&self, key: &str, blob: &str) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
}
