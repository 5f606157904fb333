use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::{ObjectBody, ObjectStore, StorageError, StorageResult};
use crate::models::{ObjectVersion, StoredObject};

const CHUNK_SIZE: usize = 64 * 1024;

struct StoredVersion {
    version_id: String,
    data: Bytes,
}

/// Versioned in-process bucket. Every write creates a new version, as a bucket
/// with versioning enabled would.
pub struct MemoryStore {
    // Key: object key, Value: versions oldest first
    objects: RwLock<BTreeMap<String, Vec<StoredVersion>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::Backend("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_all(&self) -> StorageResult<Vec<ObjectVersion>> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;

        // Keys in lexicographic order, newest version first, like S3
        Ok(objects
            .iter()
            .flat_map(|(key, versions)| {
                versions.iter().rev().map(move |version| ObjectVersion {
                    key: key.clone(),
                    size: version.data.len() as u64,
                    version_id: version.version_id.clone(),
                })
            })
            .collect())
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<StoredObject> {
        let version_id = Uuid::new_v4().simple().to_string();
        let size = data.len() as u64;

        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects
            .entry(key.to_string())
            .or_default()
            .push(StoredVersion {
                version_id: version_id.clone(),
                data,
            });

        Ok(StoredObject {
            key: key.to_string(),
            size,
            version_id,
        })
    }

    async fn get(&self, key: &str, version_id: &str) -> StorageResult<ObjectBody> {
        let data = {
            let objects = self.objects.read().map_err(|_| Self::poisoned())?;
            objects
                .get(key)
                .and_then(|versions| versions.iter().find(|v| v.version_id == version_id))
                .map(|v| v.data.clone())
                .ok_or_else(|| StorageError::NotFound {
                    key: key.to_string(),
                    version_id: version_id.to_string(),
                })?
        };

        let content_length = Some(data.len() as u64);
        let chunks: Vec<std::io::Result<Bytes>> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..(start + CHUNK_SIZE).min(data.len()))))
            .collect();

        Ok(ObjectBody {
            content_length,
            stream: stream::iter(chunks).boxed(),
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.objects.read().map_err(|_| Self::poisoned())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn read_all(body: ObjectBody) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stream = body.stream;
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_put_then_get_returns_same_bytes() {
        let store = MemoryStore::new();
        let stored = store
            .put("report.pdf", Bytes::from_static(b"0123456789"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.size, 10);

        let body = store.get("report.pdf", &stored.version_id).await.unwrap();
        assert_eq!(body.content_length, Some(10));
        assert_eq!(read_all(body).await, b"0123456789".to_vec());
    }

    #[tokio::test]
    async fn test_same_key_creates_new_versions() {
        let store = MemoryStore::new();
        let first = store.put("a.txt", Bytes::from_static(b"one"), "text/plain").await.unwrap();
        let second = store.put("a.txt", Bytes::from_static(b"three"), "text/plain").await.unwrap();
        assert_ne!(first.version_id, second.version_id);

        let listed = store.list_all().await.unwrap();
        assert_eq!(
            listed,
            vec![
                ObjectVersion {
                    key: "a.txt".to_string(),
                    size: 5,
                    version_id: second.version_id.clone(),
                },
                ObjectVersion {
                    key: "a.txt".to_string(),
                    size: 3,
                    version_id: first.version_id.clone(),
                },
            ]
        );

        let old = store.get("a.txt", &first.version_id).await.unwrap();
        assert_eq!(read_all(old).await, b"one".to_vec());
    }

    #[tokio::test]
    async fn test_unknown_key_or_version_is_not_found() {
        let store = MemoryStore::new();
        store.put("a.txt", Bytes::from_static(b"one"), "text/plain").await.unwrap();

        assert!(matches!(
            store.get("a.txt", "missing").await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.get("b.txt", "missing").await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_large_objects_are_streamed_in_chunks() {
        let store = MemoryStore::new();
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 1]);
        let stored = store.put("big.bin", data.clone(), "application/octet-stream").await.unwrap();

        let body = store.get("big.bin", &stored.version_id).await.unwrap();
        let chunks: Vec<_> = body.stream.collect().await;
        assert_eq!(chunks.len(), 3);
        let total: usize = chunks.iter().map(|c| c.as_ref().unwrap().len()).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = MemoryStore::new();
        let listed = tokio_test::block_on(store.list_all()).unwrap();
        assert!(listed.is_empty());
    }
}
