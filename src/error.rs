//! Error types for election-insight.

use std::path::PathBuf;

use crate::election::model::Category;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, profiling, training or ranking.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input text could not be turned into a dataset.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// An operation was requested before its inputs were available.
    #[error("Precondition failed: {message}")]
    Precondition {
        /// What was missing.
        message: String,
    },

    /// A training task is already running in this session.
    #[error("A training task is already running")]
    Busy,

    /// The training task ended without delivering metrics.
    #[error("Training task ended before producing metrics")]
    TrainingAborted,

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Unsupported file format.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The unsupported extension.
        format: String,
    },

    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The vote store could not deliver a category.
    #[error("Vote source error for {category}: {message}")]
    Source {
        /// Category whose fetch failed.
        category: Category,
        /// Description of the failure.
        message: String,
    },

    /// Arrow error while reading columnar data.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while reading a file.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create a vote-source error for one category.
    pub fn source(category: Category, message: impl Into<String>) -> Self {
        Self::Source {
            category,
            message: message.into(),
        }
    }
}
