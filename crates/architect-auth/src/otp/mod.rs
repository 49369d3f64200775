//! One-time password registry for the password-reset flow.

pub mod entry;
pub mod registry;
pub mod sweeper;

pub use entry::OtpTicket;
pub use registry::OtpRegistry;
pub use sweeper::OtpSweeper;
