use thiserror::Error;

use super::types::Collection;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("Expected an object for a {0} record")]
    NotAnObject(Collection),

    #[error("{0} document has no identity")]
    MissingIdentity(Collection),

    #[error("Invalid time in field '{field}': {reason}")]
    InvalidTime { field: String, reason: String },

    #[error("Invalid reference in field '{0}'")]
    InvalidReference(String),

    #[error("Invalid tagged value: {0}")]
    InvalidTag(String),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
