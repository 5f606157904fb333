//! Configuration for the file gateway
//!
//! Everything is read from environment variables and validated once at startup. Loading a
//! `.env` file is left to the binary.

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub routes: RouteConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig::from_env()?;
        let config = Self {
            server,
            routes: RouteConfig::from_env(),
            upload: UploadConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.routes.validate()?;
        self.upload.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable address of this gateway, used to build download URLs
    pub public_base_url: Url,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port: u16 = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("Invalid SERVER_PORT")?;

        let public_base_url = match env::var("PUBLIC_BASE_URL") {
            Ok(raw) => Url::parse(&raw).context("Invalid PUBLIC_BASE_URL")?,
            Err(_) => {
                let fallback = format!("http://127.0.0.1:{}", port);
                tracing::warn!(
                    fallback = %fallback,
                    "PUBLIC_BASE_URL not set, download URLs will only work from this host"
                );
                Url::parse(&fallback).context("Invalid fallback base URL")?
            }
        };

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_base_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("SERVER_PORT must be non-zero");
        }
        match self.public_base_url.scheme() {
            "http" | "https" => {}
            other => bail!("PUBLIC_BASE_URL must use http or https, got '{}'", other),
        }
        if self.public_base_url.cannot_be_a_base() {
            bail!("PUBLIC_BASE_URL cannot carry path segments");
        }
        if self.public_base_url.query().is_some() || self.public_base_url.fragment().is_some() {
            bail!("PUBLIC_BASE_URL must not contain a query or fragment");
        }
        Ok(())
    }
}

/// Route layout: `<root>`, `<root>/<upload>` and `<root>/<download>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub root: String,
    pub upload: String,
    pub download: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            root: "files".to_string(),
            upload: "upload".to_string(),
            download: "download".to_string(),
        }
    }
}

impl RouteConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root: env::var("FILES_ROOT_PATH")
                .map(|v| normalize_segment(&v))
                .unwrap_or(defaults.root),
            upload: env::var("FILES_UPLOAD_PATH")
                .map(|v| normalize_segment(&v))
                .unwrap_or(defaults.upload),
            download: env::var("FILES_DOWNLOAD_PATH")
                .map(|v| normalize_segment(&v))
                .unwrap_or(defaults.download),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("FILES_ROOT_PATH", &self.root),
            ("FILES_UPLOAD_PATH", &self.upload),
            ("FILES_DOWNLOAD_PATH", &self.download),
        ] {
            if value.is_empty() {
                bail!("{} must not be empty", name);
            }
            if value.contains(['?', '#', ':', '*']) {
                bail!("{} contains reserved characters: '{}'", name, value);
            }
        }
        if self.upload == self.download {
            bail!("FILES_UPLOAD_PATH and FILES_DOWNLOAD_PATH must differ");
        }
        if self.root == "health" {
            bail!("FILES_ROOT_PATH 'health' is reserved for the health check");
        }
        Ok(())
    }

    pub fn list_path(&self) -> String {
        format!("/{}", self.root)
    }

    pub fn upload_path(&self) -> String {
        format!("/{}/{}", self.root, self.upload)
    }

    pub fn download_path(&self) -> String {
        format!("/{}/{}", self.root, self.download)
    }
}

fn normalize_segment(raw: &str) -> String {
    raw.trim().trim_matches('/').to_string()
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_size_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * 1024 * 1024,
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self> {
        let max_size_mb: usize = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .context("Invalid MAX_UPLOAD_SIZE_MB")?;

        Ok(Self {
            max_size_bytes: max_size_mb
                .checked_mul(1024 * 1024)
                .ok_or_else(|| anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            bail!("MAX_UPLOAD_SIZE_MB must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" | "minio" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3: S3Config,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "s3".to_string())
                .parse::<StorageBackend>()
                .context("Invalid STORAGE_BACKEND")?,
            s3: S3Config::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            StorageBackend::S3 => self.s3.validate(),
            StorageBackend::Memory => Ok(()),
        }
    }
}

/// Connection settings for the S3-compatible backend
#[derive(Clone)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
}

// Hand-written so the secret key never ends up in logs
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok().filter(|v| !v.trim().is_empty()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("S3_BUCKET").unwrap_or_default(),
            access_key_id: env::var("S3_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty()),
            secret_access_key: env::var("S3_SECRET_ACCESS_KEY").ok().filter(|v| !v.is_empty()),
            force_path_style: env::var("S3_FORCE_PATH_STYLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .context("Invalid S3_FORCE_PATH_STYLE")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            bail!("S3_BUCKET is required for the s3 storage backend");
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            bail!("S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together");
        }
        if let Some(endpoint) = &self.endpoint {
            Url::parse(endpoint).context("Invalid S3_ENDPOINT")?;
        }
        Ok(())
    }
}
