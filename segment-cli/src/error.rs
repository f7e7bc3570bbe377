//! Import error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Everything that can abort an import run.
///
/// None of these are recoverable: the first one raised ends the run, and
/// anything already sent to the API stays sent.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("unreadable spreadsheet: {0}")]
    Format(String),

    #[error("missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("row {row}, column '{column}': {message}")]
    Value {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Segment API returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ImportError {
    pub(crate) fn value(row: usize, column: &str, message: impl Into<String>) -> Self {
        ImportError::Value {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a rejected request, if this error came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            ImportError::Remote { status, .. } => Some(*status),
            ImportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
