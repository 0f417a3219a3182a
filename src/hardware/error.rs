//! Location provider error types

use thiserror::Error;

/// Errors reported by location providers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider polled before `start()`
    #[error("Location provider not started")]
    NotStarted,
    /// Feeding side of the provider has gone away
    #[error("Location provider disconnected")]
    Disconnected,
    /// Platform refused location access
    #[error("Location access denied: {reason}")]
    AuthorizationDenied { reason: String },
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Whether polling again later can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProviderError::NotStarted)
    }
}
