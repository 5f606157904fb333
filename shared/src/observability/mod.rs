//! Observability utilities
//!
//! Provides centralized logging setup for all services

pub mod logging;

pub use logging::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),
}

pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
