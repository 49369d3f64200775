//! The three-step password-reset flow.

pub mod service;

pub use service::PasswordResetOrchestrator;
