// S3/MinIO client implementation

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::StreamExt;
use tokio_util::io::ReaderStream;

use super::{ObjectBody, ObjectStore, StorageError, StorageResult};
use crate::config::S3Config;
use crate::models::{ObjectVersion, StoredObject, NULL_VERSION_ID};

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from configuration. Static credentials are used when configured,
    /// otherwise the default AWS provider chain applies.
    pub async fn new(config: &S3Config) -> Self {
        tracing::info!(
            bucket = %config.bucket,
            endpoint = ?config.endpoint,
            region = %config.region,
            "Initializing S3 client"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "Static",
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        Self::from_client(Client::from_conf(s3_config), config.bucket.clone())
    }

    pub fn from_client(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_all(&self) -> StorageResult<Vec<ObjectVersion>> {
        let mut versions = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let page = self
                .client
                .list_object_versions()
                .bucket(&self.bucket)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_id_marker.take())
                .send()
                .await
                .map_err(|e| classify_sdk_error("list object versions", e))?;

            // Delete markers live in a separate list and are skipped
            for version in page.versions() {
                let Some(key) = version.key() else {
                    continue;
                };
                versions.push(ObjectVersion {
                    key: key.to_string(),
                    size: version.size().unwrap_or(0).max(0) as u64,
                    version_id: version
                        .version_id()
                        .unwrap_or(NULL_VERSION_ID)
                        .to_string(),
                });
            }

            if !page.is_truncated().unwrap_or(false) {
                break;
            }
            key_marker = page.next_key_marker().map(str::to_string);
            version_id_marker = page.next_version_id_marker().map(str::to_string);
            if key_marker.is_none() {
                tracing::warn!("Truncated version listing without a key marker, stopping");
                break;
            }
        }

        tracing::debug!(count = versions.len(), bucket = %self.bucket, "Listed object versions");
        Ok(versions)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let size = data.len() as u64;
        tracing::debug!(key, size, "Uploading object to S3");

        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| classify_sdk_error("put object", e))?;

        Ok(StoredObject {
            key: key.to_string(),
            size,
            version_id: output
                .version_id()
                .unwrap_or(NULL_VERSION_ID)
                .to_string(),
        })
    }

    async fn get(&self, key: &str, version_id: &str) -> StorageResult<ObjectBody> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .version_id(version_id)
            .send()
            .await
            .map_err(|e| {
                if is_missing_object(&e) {
                    StorageError::NotFound {
                        key: key.to_string(),
                        version_id: version_id.to_string(),
                    }
                } else {
                    classify_sdk_error("get object", e)
                }
            })?;

        let content_length = output
            .content_length()
            .and_then(|len| u64::try_from(len).ok());
        let stream = ReaderStream::new(output.body.into_async_read()).boxed();

        Ok(ObjectBody {
            content_length,
            stream,
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| classify_sdk_error("head bucket", e))?;
        Ok(())
    }
}

/// Only NoSuchKey and NoSuchVersion mean the file is gone. A missing bucket is a backend fault.
fn is_missing_object(err: &SdkError<GetObjectError, HttpResponse>) -> bool {
    let SdkError::ServiceError(context) = err else {
        return false;
    };
    if context.err().is_no_such_key() {
        return true;
    }
    match context.err().code() {
        Some(code) => matches!(code, "NoSuchKey" | "NoSuchVersion"),
        // No error body to read a code from
        None => context.raw().status().as_u16() == 404,
    }
}

/// Map an SDK failure onto the gateway's storage taxonomy
fn classify_sdk_error<E>(operation: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = format!("{} failed: {}", operation, DisplayErrorContext(&err));

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            StorageError::Unavailable(message)
        }
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            match context.err().code() {
                Some("SlowDown" | "ServiceUnavailable" | "RequestTimeout") => {
                    StorageError::Unavailable(message)
                }
                Some("InvalidArgument" | "KeyTooLongError" | "InvalidObjectName") => {
                    StorageError::InvalidRequest(message)
                }
                _ if status == 503 => StorageError::Unavailable(message),
                _ => StorageError::Backend(message),
            }
        }
        _ => StorageError::Backend(message),
    }
}
