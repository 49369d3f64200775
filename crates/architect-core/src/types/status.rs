//! Status codes and the tagged outcome returned by boundary operations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, ErrorKind};

/// Status reported by every credential and password-reset operation.
///
/// The numeric values follow the HTTP convention the web frontend expects,
/// but nothing here depends on an HTTP stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    Created,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
}

impl StatusCode {
    /// Numeric code for this status.
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InternalServerError => 500,
        }
    }

    /// Whether the status signals success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Created)
    }

    /// Return the status as an upper-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "CREATED",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.as_str())
    }
}

impl From<ErrorKind> for StatusCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Authentication => Self::Unauthorized,
            ErrorKind::Authorization => Self::Forbidden,
            ErrorKind::Validation => Self::BadRequest,
            ErrorKind::Conflict => Self::Conflict,
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::ExternalService => Self::InternalServerError,
        }
    }
}

impl From<&AppError> for StatusCode {
    fn from(err: &AppError) -> Self {
        err.kind.into()
    }
}

/// A status plus an optional payload.
///
/// Callers map the status to user-facing messages themselves; there is no
/// structured error detail beyond the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    /// Result status.
    pub status: StatusCode,
    /// Payload, present on success paths that produce one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> Outcome<T> {
    /// `OK` with a payload.
    pub fn ok(payload: T) -> Self {
        Self {
            status: StatusCode::Ok,
            payload: Some(payload),
        }
    }

    /// `CREATED` with a payload.
    pub fn created(payload: T) -> Self {
        Self {
            status: StatusCode::Created,
            payload: Some(payload),
        }
    }

    /// A bare status without payload.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Map an error to its status, dropping any payload.
    pub fn from_error(err: &AppError) -> Self {
        Self::status(StatusCode::from(err))
    }

    /// Whether the status signals success.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Consume the outcome, returning the payload if any.
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Created.as_u16(), 201);
        assert_eq!(StatusCode::Conflict.as_u16(), 409);
        assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            StatusCode::from(ErrorKind::Validation),
            StatusCode::BadRequest
        );
        assert_eq!(
            StatusCode::from(ErrorKind::Authentication),
            StatusCode::Unauthorized
        );
        assert_eq!(
            StatusCode::from(ErrorKind::ExternalService),
            StatusCode::InternalServerError
        );
        assert_eq!(
            StatusCode::from(&AppError::not_found("nobody")),
            StatusCode::NotFound
        );
    }

    #[test]
    fn test_outcome_constructors() {
        let created = Outcome::created("token".to_string());
        assert!(created.is_success());
        assert_eq!(created.status, StatusCode::Created);

        let failed: Outcome<String> = Outcome::from_error(&AppError::database("down"));
        assert_eq!(failed.status, StatusCode::InternalServerError);
        assert!(failed.into_payload().is_none());
    }

    #[test]
    fn test_serializes_status_label() {
        let outcome: Outcome<()> = Outcome::status(StatusCode::BadRequest);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "BAD_REQUEST" }));
    }
}
