//! Unified application error types for Architect.
//!
//! Repositories, the token signer, the password hasher and the mail
//! transport all return [`AppError`] so failures propagate through `?`.
//! Boundary operations translate the [`ErrorKind`] into a
//! [`StatusCode`](crate::types::StatusCode) instead of returning the error.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested entity was not found.
    NotFound,
    /// Credentials did not match, or a token failed verification.
    Authentication,
    /// The caller's role or access flag is insufficient.
    Authorization,
    /// Input was malformed, invalid, or expired.
    Validation,
    /// A unique key already exists.
    Conflict,
    /// An unexpected internal failure.
    Internal,
    /// The persistent store failed.
    Database,
    /// Configuration could not be loaded or is invalid.
    Configuration,
    /// Serialization or deserialization failed.
    Serialization,
    /// An external collaborator (mail transport) failed.
    ExternalService,
}

impl ErrorKind {
    /// Upper-case label used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ExternalService => "EXTERNAL_SERVICE",
        }
    }

    /// Whether the caller, rather than the system, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::Authentication
                | Self::Authorization
                | Self::Validation
                | Self::Conflict
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout Architect.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::conflict("email already registered");
        assert_eq!(err.to_string(), "CONFLICT: email already registered");
    }

    #[test]
    fn test_client_errors() {
        assert!(ErrorKind::Conflict.is_client_error());
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(!ErrorKind::Database.is_client_error());
        assert!(!ErrorKind::ExternalService.is_client_error());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("socket closed");
        let err = AppError::with_source(ErrorKind::ExternalService, "send failed", io);
        assert!(err.source.is_some());

        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::ExternalService);
        assert!(cloned.source.is_none());
    }
}
