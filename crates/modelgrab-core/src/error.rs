//! Error types for modelgrab core

use thiserror::Error;

/// Errors that end a run, or a phase of it
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Serialization(error.to_string())
    }
}

/// Failures local to a single catalog entry.
///
/// Everything except [`ItemError::Io`] is tallied as a failed item and the
/// run moves on to the next entry; an IO error ends the run as
/// [`FetchError::Io`].
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Model not downloadable")]
    NotDownloadable,

    #[error("Could not get download URL (status {0})")]
    ResolutionStatus(u16),

    #[error("Unreadable download response: {0}")]
    InvalidResolution(String),

    #[error("No download URL available")]
    NoDownloadUrl,

    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),

    #[error("Download failed with status {0}")]
    TransferStatus(u16),

    #[error("{0}")]
    Transfer(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
