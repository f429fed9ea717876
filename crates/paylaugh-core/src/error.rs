//! Error types for PAYLAUGH sessions

use thiserror::Error;

/// Core PAYLAUGH errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaylaughError {
    // Boundary errors (fatal to the session)
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Resource load failure: {0}")]
    ResourceLoadFailure(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    // Per-tick errors (transient)
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // Lifecycle errors
    #[error("Cannot {action} while session is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
}

impl PaylaughError {
    /// Whether this error ends the session (only a fresh session recovers)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PaylaughError::PermissionDenied
                | PaylaughError::ResourceLoadFailure(_)
                | PaylaughError::DeviceUnavailable(_)
        )
    }
}

/// Result type for PAYLAUGH operations
pub type PaylaughResult<T> = Result<T, PaylaughError>;
