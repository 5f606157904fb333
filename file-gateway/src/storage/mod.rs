//! Storage access for the gateway's bucket
//!
//! `ObjectStore` is the seam between the HTTP layer and the object-storage backend.
//! `S3Store` talks to any S3-compatible service; `MemoryStore` keeps versions in
//! process and backs local development and tests.

pub mod memory;
pub mod s3_client;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::models::{ObjectVersion, StoredObject};

pub use memory::MemoryStore;
pub use s3_client::S3Store;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File '{key}' with version '{version_id}' not found")]
    NotFound { key: String, version_id: String },

    #[error("Storage rejected the request: {0}")]
    InvalidRequest(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object content as it arrives from the backend
pub type ObjectStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A readable object version
pub struct ObjectBody {
    /// Size reported by the backend, if any
    pub content_length: Option<u64>,
    pub stream: ObjectStream,
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every version of every object in the bucket, in backend listing order
    async fn list_all(&self) -> StorageResult<Vec<ObjectVersion>>;

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject>;

    async fn get(&self, key: &str, version_id: &str) -> StorageResult<ObjectBody>;

    async fn health_check(&self) -> StorageResult<()>;
}
