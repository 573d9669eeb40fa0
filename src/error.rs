//! Error types for fileshelf.

use thiserror::Error;

/// Main error type for fileshelf operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No record with this id exists
    #[error("file with id {0} not found")]
    NotFound(i64),

    /// The uploaded bytes could not be read as their declared kind
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// The request itself was unusable (bad multipart body, no files)
    #[error("validation error: {0}")]
    Validation(String),

    /// SQLite failure
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A stored row no longer matches the record model
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking extraction task panicked or was cancelled
    #[error("task failed: {0}")]
    Join(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short, stable name of the variant, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Extraction(_) => "ExtractionError",
            Self::Validation(_) => "ValidationError",
            Self::Store(_) => "StoreError",
            Self::Corrupt(_) => "CorruptRecord",
            Self::Serialization(_) => "SerializationError",
            Self::Io(_) => "IoError",
            Self::Join(_) => "TaskError",
        }
    }
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("content is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("malformed CSV at record {record}: {message}")]
    Parse { record: u64, message: String },

    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("unreadable PDF: {0}")]
    Pdf(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type alias for fileshelf operations.
pub type Result<T> = std::result::Result<T, Error>;
