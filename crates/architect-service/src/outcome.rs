//! Translation of internal results into boundary outcomes.

use tracing::{error, warn};

use architect_core::{AppError, AppResult, Outcome, StatusCode};

/// Logs a failed boundary operation at a level matching its severity.
fn log_failure(operation: &'static str, err: &AppError) {
    if err.kind.is_client_error() {
        let status = StatusCode::from(err);
        warn!(operation, %status, error = %err, "Operation rejected");
    } else {
        error!(operation, kind = %err.kind, error = %err, "Operation failed");
    }
}

/// Maps `result` to an outcome, using `success` to wrap the payload.
pub(crate) fn respond<T>(
    operation: &'static str,
    result: AppResult<T>,
    success: impl FnOnce(T) -> Outcome<T>,
) -> Outcome<T> {
    match result {
        Ok(value) => success(value),
        Err(e) => {
            log_failure(operation, &e);
            Outcome::from_error(&e)
        }
    }
}
