//! Repository implementations.

pub mod credential;
pub mod memory;

pub use credential::{CredentialRepository, PgCredentialRepository};
pub use memory::MemoryCredentialRepository;
