//! Token verification.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use architect_core::config::AuthConfig;
use architect_core::error::AppError;
use architect_core::traits::Clock;

use super::claims::{Claims, TokenType};

/// Verifies token signatures and expiry.
///
/// Expiry is judged against the injected [`Clock`] rather than the system
/// time, so `exp` is excluded from the library's own validation.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            leeway_seconds: config.leeway_seconds,
            clock,
        }
    }

    /// Checks signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            })?;

        if claims.is_expired_at(self.clock.now(), self.leeway_seconds) {
            return Err(AppError::authentication("Token has expired"));
        }

        Ok(claims)
    }

    /// Like [`verify`](Self::verify), additionally requiring `expected` kind.
    pub fn verify_kind(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(AppError::authentication(format!(
                "Invalid token type: expected {expected:?}, got {:?}",
                claims.token_type
            )));
        }
        Ok(claims)
    }

    /// Reads the claims without checking the signature or expiry.
    ///
    /// Never use the result for an authorization decision.
    pub fn decode_unverified(token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::validation(format!("Malformed token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::TokenSigner;
    use architect_core::error::ErrorKind;
    use architect_core::traits::ManualClock;
    use chrono::Duration;
    use uuid::Uuid;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    fn pair(clock: Arc<ManualClock>) -> (TokenSigner, TokenVerifier) {
        let cfg = config("timetable-secret");
        (
            TokenSigner::new(&cfg, clock.clone()).unwrap(),
            TokenVerifier::new(&cfg, clock),
        )
    }

    #[test]
    fn test_session_round_trip() {
        let clock = Arc::new(ManualClock::default());
        let (signer, verifier) = pair(clock);
        let user_id = Uuid::new_v4();

        let token = signer.sign_session(user_id, "hod@college.edu").unwrap();
        let claims = verifier.verify_kind(&token, TokenType::Session).unwrap();

        assert_eq!(claims.email(), "hod@college.edu");
        assert_eq!(claims.uid, Some(user_id));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        let (signer, verifier) = pair(clock);
        let token = signer.sign_session(Uuid::new_v4(), "a@b.c").unwrap();
        let forged = signer.sign_session(Uuid::new_v4(), "admin@b.c").unwrap();

        // Forged payload under the genuine signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        let err = verifier.verify(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_rotated_secret_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        let old = TokenSigner::new(&config("old-secret"), clock.clone()).unwrap();
        let verifier = TokenVerifier::new(&config("new-secret"), clock);

        let token = old.sign_session(Uuid::new_v4(), "a@b.c").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_expiry_follows_injected_clock() {
        let clock = Arc::new(ManualClock::default());
        let (signer, verifier) = pair(clock.clone());
        let token = signer.sign_reset("a@b.c", 123456).unwrap();

        clock.advance(Duration::minutes(9));
        assert!(verifier.verify(&token).is_ok());

        clock.advance(Duration::minutes(2));
        let err = verifier.verify(&token).unwrap_err();
        assert!(err.message.contains("expired"));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        let (signer, verifier) = pair(clock);
        let token = signer.sign_email_verification("a@b.c").unwrap();

        assert!(
            verifier
                .verify_kind(&token, TokenType::PasswordReset)
                .is_err()
        );
        assert!(
            verifier
                .verify_kind(&token, TokenType::EmailVerification)
                .is_ok()
        );
    }

    #[test]
    fn test_decode_unverified_ignores_signature() {
        let clock = Arc::new(ManualClock::default());
        let signer = TokenSigner::new(&config("someone-elses-secret"), clock).unwrap();
        let token = signer.sign_reset("a@b.c", 654321).unwrap();

        let claims = TokenVerifier::decode_unverified(&token).unwrap();
        assert_eq!(claims.otp, Some(654321));
        assert!(TokenVerifier::decode_unverified("garbage").is_err());
    }
}
