//! Mail composition and delivery backends.

pub mod memory;
pub mod smtp;
pub mod template;

pub use memory::MemoryMailTransport;
pub use smtp::SmtpMailTransport;
pub use template::OtpMailTemplate;
