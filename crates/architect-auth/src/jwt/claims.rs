//! Claims carried by every token Architect signs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims payload shared by session, reset, and e-mail verification tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject, the e-mail address the token speaks for.
    pub sub: String,
    /// User ID, present on session tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    /// The verified one-time code, present on reset tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<u32>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID, used to redeem reset tokens only once.
    pub jti: Uuid,
    /// What the token authorizes.
    pub token_type: TokenType,
}

/// Distinguishes what a token may be used for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Bearer identity after login or registration.
    Session,
    /// One-shot capability to change a password.
    PasswordReset,
    /// Link sent to confirm ownership of an e-mail address.
    EmailVerification,
}

impl Claims {
    /// The e-mail address in the subject claim.
    pub fn email(&self) -> &str {
        &self.sub
    }

    /// Whether the token is past its expiry at `now`, allowing `leeway_seconds`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: u64) -> bool {
        let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
        now.timestamp() > self.exp.saturating_add(leeway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> Claims {
        Claims {
            sub: "teacher@school.in".to_string(),
            uid: None,
            otp: Some(482913),
            iat: exp - 600,
            exp,
            jti: Uuid::new_v4(),
            token_type: TokenType::PasswordReset,
        }
    }

    #[test]
    fn test_expiry_respects_leeway() {
        let now = Utc::now();
        let c = claims(now.timestamp() - 3);
        assert!(!c.is_expired_at(now, 5));
        assert!(c.is_expired_at(now, 0));
    }

    #[test]
    fn test_session_fields_are_omitted_on_reset_tokens() {
        let c = claims(Utc::now().timestamp());
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("uid").is_none());
        assert_eq!(json["token_type"], "password_reset");
        assert_eq!(json["otp"], 482913);
    }
}
