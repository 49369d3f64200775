//! Outgoing mail configuration.

use serde::{Deserialize, Serialize};

/// SMTP relay settings used for password-reset mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address placed in the `From` header.
    #[serde(default = "default_from")]
    pub from: String,
    /// SMTP relay host.
    #[serde(default = "default_host")]
    pub host: String,
    /// SMTP relay port (465 implies implicit TLS).
    #[serde(default = "default_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password or app access token.
    #[serde(default)]
    pub password: String,
    /// Per-send timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_from() -> String {
    "Architect Developers <no-reply@architect.local>".to_string()
}

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_port() -> u16 {
    465
}

fn default_timeout() -> u64 {
    10
}
