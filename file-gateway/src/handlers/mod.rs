pub mod file_download;
pub mod file_upload;
pub mod files;
pub mod health;
pub mod validation;
