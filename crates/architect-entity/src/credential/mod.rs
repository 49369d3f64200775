//! Credential domain entities.

pub mod model;
pub mod role;

pub use model::{CreateCredential, Credential, Position};
pub use role::UserRole;
