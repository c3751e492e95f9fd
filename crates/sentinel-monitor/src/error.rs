//! Error types for sentinel-monitor.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by monitor sessions and the registry.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Bad or missing monitor request parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested lifecycle transition is not allowed from the current state.
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

impl MonitorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
