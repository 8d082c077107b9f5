use crate::backend::BackendId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Query errors
    #[error("Invalid lyrics query: {reason}")]
    InvalidQuery { reason: String },

    // Backend errors
    #[error("Backend {backend} unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    #[error("Failed to decode lyrics from {backend}: {reason}")]
    DecodeFailure { backend: String, reason: String },

    // Aggregation errors
    #[error("Internal aggregation error: {reason}")]
    Internal { reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed JSON response: {0}")]
    JsonError(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Attribute a transport or response-format failure to `backend`.
    ///
    /// Network, JSON and IO errors become [`CoreError::BackendUnavailable`];
    /// every other variant is returned unchanged.
    #[must_use]
    pub fn for_backend(self, backend: BackendId) -> Self {
        match self {
            Self::NetworkError(_) | Self::JsonError(_) | Self::IoError(_) => Self::BackendUnavailable {
                backend: backend.to_string(),
                reason: self.to_string(),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
