//! # architect-auth
//!
//! Credential primitives for Architect.
//!
//! ## Modules
//!
//! - `jwt`: signed session, reset, and e-mail verification tokens, plus the
//!   ledger of spent reset tokens
//! - `password`: Argon2id password hashing
//! - `otp`: the process-wide one-time password registry and its expiry sweeper

pub mod jwt;
pub mod otp;
pub mod password;

pub use jwt::{Claims, SpentTokenLedger, TokenSigner, TokenType, TokenVerifier};
pub use otp::{OtpRegistry, OtpSweeper, OtpTicket};
pub use password::PasswordHasher;
