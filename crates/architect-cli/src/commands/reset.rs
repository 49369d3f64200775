//! Interactive password reset.
//!
//! Codes live only in this process, so the whole flow (request, code entry,
//! new password) runs in one invocation.

use std::sync::Arc;

use clap::Args;
use dialoguer::{Input, Password};
use tokio::sync::watch;
use tracing::debug;

use architect_auth::otp::OtpSweeper;
use architect_core::config::AppConfig;
use architect_core::error::AppError;
use architect_service::{MemoryMailTransport, PasswordResetOrchestrator};

use super::{Services, input_error, require_success};
use crate::output;

/// Arguments for the reset command
#[derive(Debug, Args)]
pub struct ResetArgs {
    /// E-mail address of the account
    #[arg(short, long)]
    pub email: String,

    /// Print the code instead of mailing it
    #[arg(long)]
    pub dry_run: bool,

    /// Code entry attempts before giving up
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,
}

/// Execute the reset flow
pub async fn execute(args: &ResetArgs, config: &AppConfig) -> Result<(), AppError> {
    let services = Services::connect(config).await?;
    let outbox = args.dry_run.then(|| Arc::new(MemoryMailTransport::new()));
    let reset = services.reset_orchestrator(config, outbox.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = OtpSweeper::new(Arc::clone(&services.registry), &config.otp).spawn(shutdown_rx);

    let result = run_flow(args, &reset, outbox.as_deref()).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        debug!(error = %e, "Sweeper task ended abnormally");
    }

    result
}

async fn run_flow(
    args: &ResetArgs,
    reset: &PasswordResetOrchestrator,
    outbox: Option<&MemoryMailTransport>,
) -> Result<(), AppError> {
    let email = args.email.as_str();

    require_success("Reset request", reset.request_reset(email).await)?;
    match outbox.and_then(MemoryMailTransport::last) {
        Some(mail) => {
            output::print_warning("Dry run: mail was not sent");
            output::print_kv("to", &mail.to);
            output::print_kv("code", extract_code(&mail.html).unwrap_or("?"));
        }
        None => output::print_success(&format!("A code has been sent to '{email}'")),
    }

    let token = prompt_for_token(args, reset).await?;

    let password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .map_err(input_error)?;

    require_success(
        "Password reset",
        reset.reset_password(&token, email, &password).await,
    )?;
    output::print_success("Password changed.");
    Ok(())
}

async fn prompt_for_token(
    args: &ResetArgs,
    reset: &PasswordResetOrchestrator,
) -> Result<String, AppError> {
    for attempt in 1..=args.attempts.max(1) {
        let code: u32 = Input::new()
            .with_prompt("Code")
            .interact_text()
            .map_err(input_error)?;

        let outcome = reset.verify_otp(&args.email, code).await;
        if outcome.is_success() {
            if let Some(token) = outcome.into_payload() {
                return Ok(token);
            }
        }
        output::print_warning(&format!(
            "Code rejected ({attempt}/{})",
            args.attempts.max(1)
        ));
    }

    Err(AppError::validation("Too many invalid codes"))
}

/// The code inside a rendered reset mail.
fn extract_code(html: &str) -> Option<&str> {
    let start = html.find("<strong>")? + "<strong>".len();
    let end = start + html[start..].find("</strong>")?;
    Some(&html[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::config::MailConfig;
    use architect_service::OtpMailTemplate;

    #[test]
    fn test_extract_code_from_rendered_mail() {
        let html = OtpMailTemplate::new(&MailConfig::default()).render(123456);
        assert_eq!(extract_code(&html), Some("123456"));
        assert_eq!(extract_code("<p>nothing</p>"), None);
    }
}
