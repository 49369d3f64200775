//! # architect-core
//!
//! Core crate for the Architect timetable platform's authentication slice.
//! Contains the unified error system, the status codes every boundary
//! operation reports, configuration schemas, and the collaborator traits
//! (clock, mail transport) that the other crates are wired through.
//!
//! This crate has **no** internal dependencies on other Architect crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::{Outcome, StatusCode};
