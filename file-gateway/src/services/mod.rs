pub mod download_url;
pub mod file_service;

pub use download_url::DownloadUrlBuilder;
pub use file_service::FileService;
