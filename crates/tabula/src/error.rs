//! Error types for the Tabula library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tabula operations.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or nothing that could be read as a table.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Input parsed but does not describe a rectangular table.
    #[error("Input is not tabular: {0}")]
    NotTabular(String),

    /// A dataset could not be assembled from the given columns.
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// Unexpected failure inside a pipeline stage.
    #[error("Analysis error in {stage}: {message}")]
    Analysis { stage: &'static str, message: String },
}

impl TabulaError {
    /// Wrap an unexpected stage failure.
    pub fn analysis(stage: &'static str, message: impl Into<String>) -> Self {
        TabulaError::Analysis {
            stage,
            message: message.into(),
        }
    }

    /// Whether the error comes from the input rather than the pipeline.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, TabulaError::Analysis { .. } | TabulaError::Io { .. })
    }
}

/// Structural problems found while building a [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A column's length differs from the first column.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type alias for Tabula operations.
pub type Result<T> = std::result::Result<T, TabulaError>;
