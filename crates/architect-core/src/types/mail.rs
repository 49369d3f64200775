//! Outgoing mail envelope handed to a [`MailTransport`](crate::traits::MailTransport).

use serde::{Deserialize, Serialize};

/// A fully composed HTML message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}
