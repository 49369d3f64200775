//! CLI command definitions and dispatch.

pub mod migrate;
pub mod reset;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use architect_auth::otp::OtpRegistry;
use architect_auth::password::PasswordHasher;
use architect_core::config::AppConfig;
use architect_core::error::{AppError, ErrorKind};
use architect_core::traits::{Clock, MailTransport, SystemClock};
use architect_core::{Outcome, StatusCode};
use architect_database::{DatabasePool, PgCredentialRepository};
use architect_service::{
    CredentialService, MemoryMailTransport, PasswordResetOrchestrator, SmtpMailTransport,
};

use crate::output::OutputFormat;

/// Architect: account administration for the timetable platform
#[derive(Debug, Parser)]
#[command(name = "architect", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded next to the configuration file
    #[arg(short, long, env = "ARCHITECT_ENV")]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account registration, login, and verification
    User(user::UserArgs),
    /// Interactive password reset by e-mailed code
    Reset(reset::ResetArgs),
}

impl Cli {
    /// Load the merged configuration.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, self.env.as_deref())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Reset(args) => reset::execute(args, &config).await,
        }
    }
}

/// Services wired against the configured store.
#[derive(Debug)]
pub struct Services {
    pub credentials: Arc<CredentialService>,
    pub registry: Arc<OtpRegistry>,
}

impl Services {
    /// Connect to the store and build the credential service.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let repo = Arc::new(PgCredentialRepository::new(db.pool().clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let credentials = Arc::new(CredentialService::new(
            repo,
            Arc::new(PasswordHasher::new()),
            &config.auth,
            Arc::clone(&clock),
        )?);
        let registry = Arc::new(OtpRegistry::new(&config.otp, clock)?);

        Ok(Self {
            credentials,
            registry,
        })
    }

    /// Build the reset orchestrator. `dry_run` records mail instead of sending it.
    pub fn reset_orchestrator(
        &self,
        config: &AppConfig,
        dry_run: Option<Arc<MemoryMailTransport>>,
    ) -> Result<PasswordResetOrchestrator, AppError> {
        let mailer: Arc<dyn MailTransport> = match dry_run {
            Some(outbox) => outbox as Arc<dyn MailTransport>,
            None => Arc::new(SmtpMailTransport::new(&config.mail)?),
        };

        Ok(PasswordResetOrchestrator::new(
            Arc::clone(&self.credentials),
            Arc::clone(&self.registry),
            mailer,
            &config.mail,
        ))
    }
}

/// Turn a non-success outcome into an error naming `action`.
pub fn require_success<T>(action: &str, outcome: Outcome<T>) -> Result<Option<T>, AppError> {
    if outcome.is_success() {
        return Ok(outcome.into_payload());
    }

    let kind = match outcome.status {
        StatusCode::BadRequest => ErrorKind::Validation,
        StatusCode::Unauthorized => ErrorKind::Authentication,
        StatusCode::Forbidden => ErrorKind::Authorization,
        StatusCode::NotFound => ErrorKind::NotFound,
        StatusCode::Conflict => ErrorKind::Conflict,
        _ => ErrorKind::Internal,
    };
    Err(AppError::new(
        kind,
        format!("{action} failed ({})", outcome.status),
    ))
}

/// Map a prompt failure into an application error.
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
