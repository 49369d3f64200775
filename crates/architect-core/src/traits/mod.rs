//! Collaborator traits defined in `architect-core` and implemented by other crates.

pub mod clock;
pub mod mail;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mail::MailTransport;
