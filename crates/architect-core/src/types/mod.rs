//! Shared value types used across Architect crates.

pub mod mail;
pub mod status;

pub use mail::OutgoingMail;
pub use status::{Outcome, StatusCode};
