//! Collaborator Error Types

use thiserror::Error;

/// Failures reported by external text/image generation collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The call reached the provider but failed
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// The provider answered with something structurally unusable
    #[error("Provider returned malformed data: {0}")]
    Malformed(String),

    #[error("Provider call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// No provider is configured or reachable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
