use bytes::Bytes;
use std::sync::Arc;

use super::download_url::DownloadUrlBuilder;
use crate::models::FileRecord;
use crate::storage::{ObjectBody, ObjectStore, StorageResult};

/// List, upload and download operations over the configured bucket
pub struct FileService {
    store: Arc<dyn ObjectStore>,
    urls: DownloadUrlBuilder,
}

impl FileService {
    pub fn new(store: Arc<dyn ObjectStore>, urls: DownloadUrlBuilder) -> Self {
        Self { store, urls }
    }

    /// All object versions in backend listing order
    ///
    /// A backend failure is returned as an error; an empty bucket is an empty list.
    pub async fn list_files(&self) -> StorageResult<Vec<FileRecord>> {
        let versions = self.store.list_all().await?;

        Ok(versions
            .into_iter()
            .map(|v| self.record(v.key, v.size, v.version_id))
            .collect())
    }

    /// Store `data` under `file_name`; same-named uploads become new versions
    pub async fn upload_file(
        &self,
        file_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<FileRecord> {
        let stored = self.store.put(file_name, data, content_type).await?;
        Ok(self.record(stored.key, stored.size, stored.version_id))
    }

    pub async fn download_file(&self, file_name: &str, version_id: &str) -> StorageResult<ObjectBody> {
        self.store.get(file_name, version_id).await
    }

    pub async fn storage_healthy(&self) -> bool {
        match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Storage health check failed");
                false
            }
        }
    }

    fn record(&self, filename: String, size: u64, version_id: String) -> FileRecord {
        let url = self.urls.build(&filename, &version_id);
        FileRecord {
            filename,
            size,
            version_id,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::models::{ObjectVersion, StoredObject};
    use crate::storage::{MockObjectStore, StorageError};
    use pretty_assertions::assert_eq;
    use url::Url;

    fn service(store: MockObjectStore) -> FileService {
        let urls = DownloadUrlBuilder::new(
            &Url::parse("http://gateway.local:8080").unwrap(),
            &RouteConfig::default(),
        )
        .unwrap();
        FileService::new(Arc::new(store), urls)
    }

    #[tokio::test]
    async fn test_list_builds_records_with_urls() {
        let mut store = MockObjectStore::new();
        store.expect_list_all().times(1).returning(|| {
            Ok(vec![
                ObjectVersion {
                    key: "b.txt".to_string(),
                    size: 3,
                    version_id: "v2".to_string(),
                },
                ObjectVersion {
                    key: "a.txt".to_string(),
                    size: 0,
                    version_id: "null".to_string(),
                },
            ])
        });

        let records = service(store).list_files().await.unwrap();
        assert_eq!(
            records,
            vec![
                FileRecord {
                    filename: "b.txt".to_string(),
                    size: 3,
                    version_id: "v2".to_string(),
                    url: "http://gateway.local:8080/files/download?fileName=b.txt&versionId=v2"
                        .to_string(),
                },
                FileRecord {
                    filename: "a.txt".to_string(),
                    size: 0,
                    version_id: "null".to_string(),
                    url: "http://gateway.local:8080/files/download?fileName=a.txt&versionId=null"
                        .to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_failure_is_not_swallowed() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_all()
            .returning(|| Err(StorageError::Unavailable("connection refused".to_string())));

        let result = service(store).list_files().await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_upload_passes_content_type_and_reports_backend_version() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .withf(|key, data, content_type| {
                key.to_string() == "report.pdf"
                    && data == &Bytes::from_static(b"0123456789")
                    && content_type.to_string() == "application/pdf"
            })
            .times(1)
            .returning(|key, data, _| {
                Ok(StoredObject {
                    key: key.to_string(),
                    size: data.len() as u64,
                    version_id: "v1".to_string(),
                })
            });

        let record = service(store)
            .upload_file("report.pdf", Bytes::from_static(b"0123456789"), "application/pdf")
            .await
            .unwrap();

        assert_eq!(record.filename, "report.pdf");
        assert_eq!(record.size, 10);
        assert_eq!(record.version_id, "v1");
        assert!(record.url.ends_with("/files/download?fileName=report.pdf&versionId=v1"));
    }

    #[tokio::test]
    async fn test_download_not_found_is_passed_through() {
        let mut store = MockObjectStore::new();
        store.expect_get().returning(|key, version_id| {
            Err(StorageError::NotFound {
                key: key.to_string(),
                version_id: version_id.to_string(),
            })
        });

        let err = service(store).download_file("ghost.txt", "v0").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_health_reflects_backend() {
        let mut healthy = MockObjectStore::new();
        healthy.expect_health_check().returning(|| Ok(()));
        assert!(service(healthy).storage_healthy().await);

        let mut broken = MockObjectStore::new();
        broken
            .expect_health_check()
            .returning(|| Err(StorageError::Backend("NoSuchBucket".to_string())));
        assert!(!service(broken).storage_healthy().await);
    }
}
