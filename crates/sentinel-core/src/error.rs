//! Error taxonomy shared by the scan, deploy and monitor pipelines.

use thiserror::Error;

/// Errors surfaced by sentinel operations.
///
/// One-shot operations (scan, deploy) return the first error they hit. The
/// monitor poll loop swallows [`SentinelError::Provider`] per tick and retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SentinelError {
    /// Bad or missing input. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upstream AI or chain collaborator failed or was unreachable.
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// Contract submission or confirmation failed.
    #[error("deployment failed: {0}")]
    Deployment(String),
}

impl SentinelError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn deployment(message: impl Into<String>) -> Self {
        Self::Deployment(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for sentinel operations.
pub type SentinelResult<T> = Result<T, SentinelError>;
