//! Database migration commands.

use clap::{Args, Subcommand};

use architect_core::config::AppConfig;
use architect_core::error::AppError;
use architect_database::DatabasePool;
use architect_service::SmtpMailTransport;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the credential store and the mail relay are reachable
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let db = DatabasePool::connect_and_migrate(&config.database).await?;
            output::print_success("All migrations applied.");
            db.close().await;
        }
        MigrateCommand::Check => {
            let db = DatabasePool::connect(&config.database).await?;
            let store_ok = db.health_check().await;
            db.close().await;
            if !store_ok {
                return Err(AppError::database("Credential store did not answer"));
            }
            output::print_success("Credential store is reachable.");

            let relay = SmtpMailTransport::new(&config.mail)?;
            if !relay.test_connection().await? {
                return Err(AppError::external_service(format!(
                    "Mail relay '{}' refused the connection",
                    config.mail.host
                )));
            }
            output::print_success("Mail relay is reachable.");
        }
    }

    Ok(())
}
