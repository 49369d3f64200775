//! Mail transport trait for pluggable delivery backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::OutgoingMail;

/// Delivers composed mail.
///
/// Implementations report failures as
/// [`ErrorKind::ExternalService`](crate::error::ErrorKind::ExternalService).
/// No delivery guarantee is assumed beyond what the backend offers.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Send a single message.
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()>;
}
