//! HTTP gateway for an S3-compatible bucket: list versions, upload files and
//! stream a given file version back.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;
use std::time::Instant;

use config::Config;
use services::{DownloadUrlBuilder, FileService};
use storage::ObjectStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileService>,
    pub max_upload_bytes: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, config: &Config) -> anyhow::Result<Self> {
        let urls = DownloadUrlBuilder::new(&config.server.public_base_url, &config.routes)?;

        Ok(Self {
            files: Arc::new(FileService::new(store, urls)),
            max_upload_bytes: config.upload.max_size_bytes,
            started_at: Instant::now(),
        })
    }
}
