//! Account commands: registration, login, token checks, and positions.

use clap::{Args, Subcommand};
use dialoguer::Password;
use serde::Serialize;
use tabled::Tabled;

use architect_core::config::AppConfig;
use architect_core::error::AppError;
use architect_entity::credential::{Position, UserRole};

use super::{Services, input_error, require_success};
use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a new account (access stays disabled until verified)
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// E-mail address
        #[arg(short, long)]
        email: String,
    },
    /// Log in and print a session token
    Login {
        /// E-mail address
        #[arg(short, long)]
        email: String,
    },
    /// Check whether a session token is valid
    VerifyToken {
        /// Session token
        token: String,
    },
    /// Print a token for an e-mail verification link
    VerificationLink {
        /// E-mail address
        #[arg(short, long)]
        email: String,
    },
    /// Grant access using an e-mail verification token
    VerifyEmail {
        /// Verification or session token
        token: String,
    },
    /// Check whether an account exists
    Exists {
        /// E-mail address
        #[arg(short, long)]
        email: String,
    },
    /// Show the position of the token's user
    Position {
        /// Session token
        token: String,
    },
    /// Assign organisation, department and role
    Assign {
        /// E-mail address
        #[arg(short, long)]
        email: String,
        /// Organisation name
        #[arg(short, long)]
        organisation: Option<String>,
        /// Department name
        #[arg(short, long)]
        department: Option<String>,
        /// Role: admin, editor, or viewer
        #[arg(short, long)]
        role: Option<UserRole>,
    },
}

/// Position display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PositionRow {
    /// User ID
    id: String,
    /// Name
    name: String,
    /// Organisation
    organisation: String,
    /// Department
    department: String,
    /// Role
    role: String,
}

impl From<Position> for PositionRow {
    fn from(p: Position) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name,
            organisation: p.organisation.unwrap_or_else(|| "-".to_string()),
            department: p.department.unwrap_or_else(|| "-".to_string()),
            role: p.role.map_or_else(|| "-".to_string(), |r| r.to_string()),
        }
    }
}

fn prompt_password(confirm: bool) -> Result<String, AppError> {
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().map_err(input_error)
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::connect(config).await?;
    let credentials = &services.credentials;

    match &args.command {
        UserCommand::Register { name, email } => {
            let password = prompt_password(true)?;
            let outcome = credentials.register(name, email, &password).await;
            let token = require_success("Registration", outcome)?.unwrap_or_default();
            output::print_success(&format!("Registered '{email}' (access pending verification)"));
            output::print_value("token", &token, format);
        }
        UserCommand::Login { email } => {
            let password = prompt_password(false)?;
            let outcome = credentials.authenticate(email, &password).await;
            let token = require_success("Login", outcome)?.unwrap_or_default();
            output::print_value("token", &token, format);
        }
        UserCommand::VerifyToken { token } => {
            if credentials.verify_token(token) {
                output::print_success("Token is valid.");
            } else {
                return Err(AppError::authentication("Token is invalid or expired"));
            }
        }
        UserCommand::VerificationLink { email } => {
            let token = credentials.email_verification_token(email)?;
            output::print_value("token", &token, format);
        }
        UserCommand::VerifyEmail { token } => {
            if credentials.verify_email_link(token).await {
                output::print_success("E-mail verified, access granted.");
            } else {
                output::print_warning("Link is invalid, expired, or access was already granted.");
            }
        }
        UserCommand::Exists { email } => {
            let exists = credentials.check_user_exists(email).await?;
            output::print_value("exists", &exists.to_string(), format);
        }
        UserCommand::Position { token } => {
            let outcome = credentials.get_position(token).await;
            if let Some(position) = require_success("Position lookup", outcome)? {
                output::print_record(&PositionRow::from(position), format);
            }
        }
        UserCommand::Assign {
            email,
            organisation,
            department,
            role,
        } => {
            let outcome = credentials
                .assign_position(email, organisation.as_deref(), department.as_deref(), *role)
                .await;
            require_success("Assignment", outcome)?;
            output::print_success(&format!("Position updated for '{email}'"));
        }
    }

    Ok(())
}
