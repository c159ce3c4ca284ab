//! Unified error types for kokoro-bot.
//!
//! Module-specific errors convert into the top-level [`ChatError`] via
//! `#[from]`, so request handlers deal with a single type.

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The caller's input was rejected before any state change.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The text-generation boundary failed.
    #[error("generator: {0}")]
    Generator(#[from] GeneratorError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl ChatError {
    /// Create an invalid-input error.
    #[inline]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller, not the service, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// The message shown to callers.
    ///
    /// Generator and internal failures collapse to a generic notice; the
    /// specific kind stays in the logs. Provider error bodies and credentials
    /// never reach the caller through this path.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::Generator(_) => {
                "The assistant is temporarily unavailable. Please try again in a moment."
                    .to_string()
            }
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                "An unexpected error occurred.".to_string()
            }
        }
    }
}

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

// ============================================================================
// Generator Errors
// ============================================================================

/// Error type for the text-generation boundary.
///
/// Every failure mode of the external generator the orchestrator can observe.
/// None of these trigger internal retries; the caller may retry the whole
/// request, which is safe because a failed call persists nothing.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Credentials rejected or expired.
    #[error("authentication rejected by provider")]
    AuthFailure,

    /// Provider quota or rate limit exhausted.
    #[error("provider quota exhausted")]
    QuotaExceeded,

    /// Transient network or service fault.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider returned something that cannot be read as a reply.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Result type for generator operations.
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Missing required setting.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing-setting error.
    #[inline]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing(name.into())
    }

    /// Create an invalid-value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: ChatError = GeneratorError::QuotaExceeded.into();
        assert!(matches!(err, ChatError::Generator(_)));

        let err: ChatError = ConfigError::missing("GEMINI_API_KEY").into();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ChatError::invalid_input("empty").is_client_error());
        assert!(!ChatError::from(GeneratorError::AuthFailure).is_client_error());
    }

    #[test]
    fn test_user_message_hides_provider_detail() {
        let err = ChatError::from(GeneratorError::Unavailable(
            "HTTP 500: {\"error\": \"secret internal detail\"}".to_string(),
        ));
        let msg = err.user_message();
        assert!(!msg.contains("secret"));
        assert!(!msg.contains("500"));

        let err = ChatError::invalid_input("message must not be empty");
        assert_eq!(err.user_message(), "message must not be empty");
    }
}
