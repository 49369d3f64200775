//! # architect-service
//!
//! Boundary operations for Architect's authentication slice. Each service
//! orchestrates repositories, token primitives, the OTP registry, and mail
//! delivery, and reports every result as an [`Outcome`](architect_core::Outcome)
//! instead of an error.
//!
//! Services follow constructor injection: all collaborators are provided
//! at construction time via `Arc` references.

pub mod credential;
pub mod mail;
pub mod reset;

mod outcome;

pub use credential::CredentialService;
pub use mail::{MemoryMailTransport, OtpMailTemplate, SmtpMailTransport};
pub use reset::PasswordResetOrchestrator;
