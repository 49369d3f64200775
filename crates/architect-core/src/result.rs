//! Convenience result type alias for Architect.

use crate::error::AppError;

/// A specialized `Result` type for Architect operations.
pub type AppResult<T> = Result<T, AppError>;
