//! Token creation with configurable signing and TTLs.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use architect_core::config::AuthConfig;
use architect_core::error::AppError;
use architect_core::traits::Clock;

use super::claims::{Claims, TokenType};

/// Signs HS256 tokens for each [`TokenType`].
#[derive(Clone)]
pub struct TokenSigner {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    session_ttl: Duration,
    reset_ttl: Duration,
    email_verification_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("session_ttl", &self.session_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Creates a new signer from auth configuration.
    ///
    /// Fails if a configured lifetime cannot be represented.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            session_ttl: config.session_ttl()?,
            reset_ttl: config.reset_ttl()?,
            email_verification_ttl: config.email_verification_ttl()?,
            clock,
        })
    }

    /// Signs a session token asserting `{user id, email}`.
    pub fn sign_session(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let claims = self.claims(email, TokenType::Session, self.session_ttl);
        self.encode(&Claims {
            uid: Some(user_id),
            ..claims
        })
    }

    /// Signs a reset token wrapping a verified one-time code.
    pub fn sign_reset(&self, email: &str, code: u32) -> Result<String, AppError> {
        let claims = self.claims(email, TokenType::PasswordReset, self.reset_ttl);
        self.encode(&Claims {
            otp: Some(code),
            ..claims
        })
    }

    /// Signs a token for an e-mail confirmation link.
    pub fn sign_email_verification(&self, email: &str) -> Result<String, AppError> {
        let claims = self.claims(
            email,
            TokenType::EmailVerification,
            self.email_verification_ttl,
        );
        self.encode(&claims)
    }

    fn claims(&self, email: &str, token_type: TokenType, ttl: Duration) -> Claims {
        let now = self.clock.now();
        Claims {
            sub: email.to_string(),
            uid: None,
            otp: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!(
                "Failed to encode {:?} token: {e}",
                claims.token_type
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::error::ErrorKind;
    use architect_core::traits::ManualClock;

    #[test]
    fn test_oversized_ttl_fails_construction() {
        let config = AuthConfig {
            email_verification_ttl_hours: u64::MAX,
            ..AuthConfig::default()
        };
        let err = TokenSigner::new(&config, Arc::new(ManualClock::default())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
