//! One-time password entries.

use chrono::{DateTime, Utc};

/// Lowest code the registry hands out.
pub const MIN_CODE: u32 = 100_000;
/// Highest code the registry hands out.
pub const MAX_CODE: u32 = 999_999;

/// An outstanding code held by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OtpEntry {
    /// Registry-unique handle, so removal never hits a duplicate (email, code).
    pub id: u64,
    pub email: String,
    pub code: u32,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpEntry {
    pub fn matches(&self, email: &str, code: u32) -> bool {
        self.code == code && self.email.eq_ignore_ascii_case(email)
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Receipt returned by [`OtpRegistry::issue`](super::OtpRegistry::issue).
///
/// Holds the code to deliver and the handle needed to revoke exactly this
/// entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpTicket {
    pub(crate) id: u64,
    /// Recipient the code was issued for.
    pub email: String,
    /// The 6-digit code.
    pub code: u32,
    /// When the code stops being redeemable.
    pub expires_at: DateTime<Utc>,
}

impl From<&OtpEntry> for OtpTicket {
    fn from(entry: &OtpEntry) -> Self {
        Self {
            id: entry.id,
            email: entry.email.clone(),
            code: entry.code,
            expires_at: entry.expires_at,
        }
    }
}
