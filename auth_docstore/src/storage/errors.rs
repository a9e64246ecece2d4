use thiserror::Error;

use crate::document::{Collection, FormatError};

/// Errors raised by the document store
///
/// Database errors are carried as-is so callers see exactly what the backend
/// reported, including constraint violations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: Collection, id: String },

    #[error("Document format error: {0}")]
    Format(#[from] FormatError),

    #[error("Schema validation failed: {0}")]
    Schema(String),

    #[error("Unsupported database type")]
    UnsupportedBackend,
}

impl StorageError {
    /// Whether the backend rejected a write for breaking a unique index
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
