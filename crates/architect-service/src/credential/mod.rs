//! Registration, login, token checks, and password changes.

pub mod service;

pub use service::CredentialService;
