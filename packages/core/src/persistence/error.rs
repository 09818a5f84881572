//! Session Persistence Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed
    #[error("Session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid session list
    #[error("Session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session is missing required field: {field}")]
    MissingField { field: String },

    #[error("Session not found: {id}")]
    NotFound { id: String },
}

impl PersistenceError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}
