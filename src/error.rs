//! Error types for the playground generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Corpus storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read document {path:?}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to document {path:?}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document already received a playground in this run: {0:?}")]
    AlreadyMutated(PathBuf),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Pipeline and provider errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown section: {name} (available: {available})")]
    UnknownCategory { name: String, available: String },

    #[error("Section directory not found: {0:?}")]
    CategoryNotFound(PathBuf),

    #[error("{0} not set")]
    MissingCredential(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
