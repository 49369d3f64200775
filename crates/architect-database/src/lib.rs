//! # architect-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! credential repository (PostgreSQL-backed and in-memory).

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{CredentialRepository, MemoryCredentialRepository, PgCredentialRepository};
