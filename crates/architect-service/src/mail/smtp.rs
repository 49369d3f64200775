//! SMTP delivery through an authenticated relay.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use architect_core::config::MailConfig;
use architect_core::error::{AppError, ErrorKind};
use architect_core::result::AppResult;
use architect_core::traits::MailTransport;
use architect_core::types::OutgoingMail;

/// Port on which the relay expects implicit TLS.
const SMTPS_PORT: u16 = 465;

/// Sends mail through the relay named in [`MailConfig`].
///
/// Port 465 uses implicit TLS; any other port upgrades with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .finish()
    }
}

impl SmtpMailTransport {
    /// Builds a pooled transport from configuration. Does not connect.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let builder = if config.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid SMTP relay '{}'", config.host),
                e,
            )
        })?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .pool_config(PoolConfig::new().max_size(4))
            .build();

        Ok(Self {
            transport,
            host: config.host.clone(),
        })
    }

    /// Checks that the relay accepts a connection.
    pub async fn test_connection(&self) -> AppResult<bool> {
        self.transport.test_connection().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "SMTP connection test failed", e)
        })
    }
}

fn mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid mail address '{address}': {e}")))
}

fn build_message(mail: &OutgoingMail) -> AppResult<Message> {
    Message::builder()
        .from(mailbox(&mail.from)?)
        .to(mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(|e| AppError::internal(format!("Failed to build message: {e}")))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> AppResult<()> {
        let message = build_message(mail)?;

        let response = self.transport.send(message).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to deliver mail via {}", self.host),
                e,
            )
        })?;

        info!(
            to = %mail.to,
            code = response.code().to_string(),
            "Mail accepted by relay"
        );
        Ok(())
    }
}
