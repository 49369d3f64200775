//! One-time password configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lifetime and housekeeping settings for password-reset codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// How long an issued code stays redeemable, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Interval between background sweeps of expired codes, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl OtpConfig {
    /// How long an issued code stays redeemable.
    pub fn ttl(&self) -> Result<Duration, AppError> {
        super::auth::ttl("otp.ttl_seconds", self.ttl_seconds, 1)
    }
}

fn default_ttl() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(OtpConfig::default().ttl().unwrap(), Duration::minutes(5));
        let config = OtpConfig {
            ttl_seconds: u64::MAX,
            ..OtpConfig::default()
        };
        assert!(config.ttl().is_err());
    }
}
