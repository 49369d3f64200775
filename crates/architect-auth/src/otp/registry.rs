//! Process-wide registry of outstanding password-reset codes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use rand::Rng;
use tracing::{debug, info};

use architect_core::config::OtpConfig;
use architect_core::error::AppError;
use architect_core::traits::Clock;

use super::entry::{MAX_CODE, MIN_CODE, OtpEntry, OtpTicket};

/// Time-boxed, single-use codes keyed by (email, code).
///
/// Several codes may be outstanding for one e-mail at a time. A code leaves
/// the registry when it is consumed, revoked, or swept after expiry; expired
/// codes never match even before they are swept. All mutation happens under
/// one lock that is never held across an `.await`.
#[derive(Debug)]
pub struct OtpRegistry {
    entries: Mutex<Vec<OtpEntry>>,
    next_id: AtomicU64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl OtpRegistry {
    /// Creates an empty registry.
    ///
    /// Fails if the configured code lifetime cannot be represented.
    pub fn new(config: &OtpConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Ok(Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            ttl: config.ttl()?,
            clock,
        })
    }

    /// Issues a fresh random code for `email`.
    pub fn issue(&self, email: &str) -> OtpTicket {
        let code = rand::thread_rng().gen_range(MIN_CODE..=MAX_CODE);
        self.issue_code(email, code)
    }

    /// Registers a caller-chosen code for `email`.
    pub fn issue_code(&self, email: &str, code: u32) -> OtpTicket {
        let now = self.clock.now();
        let entry = OtpEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            email: email.to_string(),
            code,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let ticket = OtpTicket::from(&entry);

        let mut entries = self.lock();
        entries.push(entry);
        debug!(
            email,
            outstanding = entries.len(),
            expires_at = %ticket.expires_at,
            "Issued one-time code"
        );

        ticket
    }

    /// Removes the first live entry matching (`email`, `code`).
    ///
    /// Returns `true` if one was found. A second call with the same pair
    /// fails unless another identical entry is outstanding.
    pub fn verify_and_consume(&self, email: &str, code: u32) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();

        let position = entries
            .iter()
            .position(|e| e.matches(email, code) && e.is_live_at(now));

        match position {
            Some(index) => {
                let entry = entries.remove(index);
                info!(
                    email,
                    age_seconds = (now - entry.issued_at).num_seconds(),
                    "One-time code consumed"
                );
                true
            }
            None => {
                debug!(email, "No live one-time code matched");
                false
            }
        }
    }

    /// Removes exactly the entry `ticket` was issued for, if still present.
    pub fn revoke(&self, ticket: &OtpTicket) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != ticket.id);
        let removed = entries.len() < before;
        if removed {
            debug!(email = %ticket.email, "Revoked one-time code");
        }
        removed
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.is_live_at(now));
        before - entries.len()
    }

    /// Number of live codes outstanding for `email`.
    pub fn outstanding_for(&self, email: &str) -> usize {
        let now = self.clock.now();
        self.lock()
            .iter()
            .filter(|e| e.email.eq_ignore_ascii_case(email) && e.is_live_at(now))
            .count()
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OtpEntry>> {
        // A panic while holding the lock cannot leave the Vec half-mutated.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
