//! Authentication configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Signing secret used when none is configured. Never fit for deployment.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Longest lifetime any token or code may be configured with (100 years).
const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 3600;

/// Token signing and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token TTL in hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    /// Reset token TTL in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_minutes: u64,
    /// E-mail verification link TTL in hours.
    #[serde(default = "default_email_verification_ttl")]
    pub email_verification_ttl_hours: u64,
    /// Clock skew tolerated when checking expiry, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            session_ttl_hours: default_session_ttl(),
            reset_ttl_minutes: default_reset_ttl(),
            email_verification_ttl_hours: default_email_verification_ttl(),
            leeway_seconds: default_leeway(),
        }
    }
}

impl AuthConfig {
    /// Whether the signing secret is still the built-in placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Session token lifetime.
    pub fn session_ttl(&self) -> Result<Duration, AppError> {
        ttl("auth.session_ttl_hours", self.session_ttl_hours, 3600)
    }

    /// Reset token lifetime.
    pub fn reset_ttl(&self) -> Result<Duration, AppError> {
        ttl("auth.reset_ttl_minutes", self.reset_ttl_minutes, 60)
    }

    /// E-mail verification link lifetime.
    pub fn email_verification_ttl(&self) -> Result<Duration, AppError> {
        ttl(
            "auth.email_verification_ttl_hours",
            self.email_verification_ttl_hours,
            3600,
        )
    }

    /// How long a redeemed reset token must be remembered: its lifetime plus leeway.
    pub fn spent_token_retention(&self) -> Result<std::time::Duration, AppError> {
        self.reset_ttl_minutes
            .checked_mul(60)
            .and_then(|secs| secs.checked_add(self.leeway_seconds))
            .filter(|secs| *secs <= MAX_TTL_SECONDS)
            .map(std::time::Duration::from_secs)
            .ok_or_else(|| out_of_range("auth.reset_ttl_minutes"))
    }

    /// Clock skew tolerance in seconds, as a signed timestamp offset.
    pub fn leeway(&self) -> Result<i64, AppError> {
        i64::try_from(self.leeway_seconds).map_err(|_| out_of_range("auth.leeway_seconds"))
    }
}

/// Converts `value` units of `unit_seconds` into a [`Duration`] no longer than
/// [`MAX_TTL_SECONDS`].
pub(crate) fn ttl(key: &str, value: u64, unit_seconds: u64) -> Result<Duration, AppError> {
    value
        .checked_mul(unit_seconds)
        .filter(|secs| *secs <= MAX_TTL_SECONDS)
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(Duration::try_seconds)
        .ok_or_else(|| out_of_range(key))
}

fn out_of_range(key: &str) -> AppError {
    AppError::configuration(format!("'{key}' is out of range"))
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_session_ttl() -> u64 {
    24
}

fn default_reset_ttl() -> u64 {
    10
}

fn default_email_verification_ttl() -> u64 {
    24
}

fn default_leeway() -> u64 {
    5
}
