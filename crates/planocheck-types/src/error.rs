//! Error types for planocheck

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("Invalid planogram: {0}")]
    InvalidPlanogram(String),

    #[error("Store not found: {0}")]
    StoreNotFound(u64),

    #[error("Audit not found: {0}")]
    AuditNotFound(u64),

    #[error("Audit already exists: {0}")]
    AuditExists(u64),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Detection failed: {0}")]
    DetectionFailed(String),
}

impl Error {
    /// Lookup failures that map to a "not found" response at the boundary
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::StoreNotFound(_) | Error::AuditNotFound(_) | Error::FileNotFound(_)
        )
    }

    /// Malformed caller input that maps to a "bad request" response
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidDetection(_)
                | Error::InvalidPlanogram(_)
                | Error::InvalidImageFormat(_)
                | Error::Image(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
