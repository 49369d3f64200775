//! Mail transport that keeps messages in memory.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use architect_core::error::AppError;
use architect_core::result::AppResult;
use architect_core::traits::MailTransport;
use architect_core::types::OutgoingMail;

/// Records every message instead of delivering it.
///
/// Used by tests and by the CLI's `--dry-run` mode.
/// [`set_failing`](Self::set_failing) makes every send fail.
#[derive(Debug, Default)]
pub struct MemoryMailTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: AtomicBool,
}

impl MemoryMailTransport {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated delivery failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copies of every message sent so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox().clone()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<OutgoingMail> {
        self.outbox().last().cloned()
    }

    fn outbox(&self) -> std::sync::MutexGuard<'_, Vec<OutgoingMail>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MailTransport for MemoryMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Mail relay unavailable"));
        }
        debug!(to = %mail.to, subject = %mail.subject, "Recorded outgoing mail");
        self.outbox().push(mail.clone());
        Ok(())
    }
}
