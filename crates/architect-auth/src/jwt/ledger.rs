//! Ledger of redeemed reset tokens.

use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use architect_core::config::AuthConfig;
use architect_core::error::AppError;

/// Remembers which reset-token IDs have been redeemed.
///
/// Entries only need to outlive the tokens themselves, so the cache TTL is
/// the reset-token lifetime plus leeway.
#[derive(Debug, Clone)]
pub struct SpentTokenLedger {
    spent: Cache<Uuid, ()>,
}

impl SpentTokenLedger {
    /// Creates a ledger sized for the configured reset-token lifetime.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let ttl = config.spent_token_retention()?;
        Ok(Self {
            spent: Cache::builder().time_to_live(ttl).build(),
        })
    }

    /// Atomically claims `jti`. Returns `false` if it was already claimed.
    pub async fn claim(&self, jti: Uuid) -> bool {
        let fresh = self.spent.entry(jti).or_insert(()).await.is_fresh();
        if !fresh {
            debug!(%jti, "Reset token already redeemed");
        }
        fresh
    }

    /// Releases a claim so the token may be redeemed again.
    pub async fn release(&self, jti: Uuid) {
        self.spent.invalidate(&jti).await;
    }
}
