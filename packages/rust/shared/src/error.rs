//! Error types for ClauseGuard.
//!
//! Library crates use [`ClauseGuardError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ClauseGuard operations.
#[derive(Debug, thiserror::Error)]
pub enum ClauseGuardError {
    /// Unsupported upload (file type / extension).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Extraction produced no usable text.
    #[error("no readable text found")]
    EmptyInput,

    /// Segmentation produced no clauses.
    #[error("no clauses detected")]
    NoClausesDetected,

    /// A predictive service is not loaded, failed, or timed out.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Download requested for an unknown artifact name.
    #[error("artifact not found: {name}")]
    ArtifactNotFound { name: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (serialization, malformed payloads).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ClauseGuardError>;

impl ClauseGuardError {
    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a service-unavailable error from any displayable message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create an artifact-not-found error for `name`.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ArtifactNotFound { name: name.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable reason for client-facing error bodies.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_file_type",
            Self::EmptyInput => "no_readable_text",
            Self::NoClausesDetected => "no_clauses_detected",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::ArtifactNotFound { .. } => "artifact_not_found",
            Self::Config { .. } => "config_error",
            Self::Io { .. } => "io_error",
            Self::Validation { .. } => "validation_error",
        }
    }

    /// Whether the error is caused by the request rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::EmptyInput
                | Self::NoClausesDetected
                | Self::ArtifactNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ClauseGuardError::config("bad timeout");
        assert_eq!(err.to_string(), "config error: bad timeout");

        let err = ClauseGuardError::not_found("contract_modified_ab12cd34.docx");
        assert!(err.to_string().contains("contract_modified_ab12cd34.docx"));
    }

    #[test]
    fn client_errors_carry_reasons() {
        assert!(ClauseGuardError::EmptyInput.is_client_error());
        assert_eq!(ClauseGuardError::EmptyInput.reason(), "no_readable_text");
        assert_eq!(
            ClauseGuardError::invalid_input("txt").reason(),
            "invalid_file_type"
        );
        assert!(ClauseGuardError::NoClausesDetected.is_client_error());
    }

    #[test]
    fn internal_errors_are_not_client_errors() {
        let io = ClauseGuardError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(!io.is_client_error());
        assert!(!ClauseGuardError::unavailable("risk").is_client_error());
    }
}
