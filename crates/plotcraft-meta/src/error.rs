//! Error types for metadata loading

use std::path::PathBuf;

use thiserror::Error;

/// Metadata loading errors
#[derive(Debug, Error)]
pub enum MetaError {
    /// A metadata file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the expected shape
    #[error("Invalid metadata document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for metadata operations
pub type MetaResult<T> = Result<T, MetaError>;
