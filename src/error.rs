//! Quotebook error types

use thiserror::Error;

/// Quotebook error type
#[derive(Error, Debug)]
pub enum Error {
    /// A quote field was empty after trimming
    #[error("Validation error: {field} must not be empty")]
    Validation {
        /// Name of the offending field
        field: &'static str,
    },

    /// Import payload was not a JSON array
    #[error("Import error: {0}")]
    Import(String),

    /// Import file had the wrong extension
    #[error("Format error: {0}")]
    Format(String),

    /// Persistent slot write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote pull or push failed
    #[error("Sync error: {0}")]
    Sync(String),

    /// No quotes matched the selected category
    #[error("No quotes found for category '{0}'")]
    EmptyCategory(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Stable machine-readable code used by the HTTP API
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::Import(_) => "INVALID_IMPORT",
            Self::Format(_) => "UNSUPPORTED_FORMAT",
            Self::Storage(_) => "STORAGE_FAILED",
            Self::Sync(_) | Self::Http(_) => "SYNC_FAILED",
            Self::EmptyCategory(_) => "EMPTY_CATEGORY",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) | Self::Serialization(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for Quotebook operations
pub type Result<T> = std::result::Result<T, Error>;
