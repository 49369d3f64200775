//! Password-reset orchestration: request a code, trade it for a reset
//! token, then spend the token on a new password.

use std::sync::Arc;

use tracing::{error, info, warn};

use architect_auth::otp::OtpRegistry;
use architect_core::config::MailConfig;
use architect_core::traits::MailTransport;
use architect_core::{Outcome, StatusCode};

use crate::credential::CredentialService;
use crate::credential::service::normalize_email;
use crate::mail::OtpMailTemplate;

/// Drives the three-step reset flow.
///
/// ```text
/// request_reset(email)            -> OK, code mailed
/// verify_otp(email, code)         -> OK + reset token
/// reset_password(token, email, pw) -> OK
/// ```
#[derive(Debug, Clone)]
pub struct PasswordResetOrchestrator {
    credentials: Arc<CredentialService>,
    registry: Arc<OtpRegistry>,
    mailer: Arc<dyn MailTransport>,
    template: OtpMailTemplate,
}

impl PasswordResetOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        credentials: Arc<CredentialService>,
        registry: Arc<OtpRegistry>,
        mailer: Arc<dyn MailTransport>,
        mail_config: &MailConfig,
    ) -> Self {
        Self {
            credentials,
            registry,
            mailer,
            template: OtpMailTemplate::new(mail_config),
        }
    }

    /// Issues a code for `email` and mails it.
    ///
    /// `BAD_REQUEST` for an unknown e-mail. A store or delivery failure is
    /// `INTERNAL_SERVER_ERROR`, and a code whose mail failed is revoked.
    pub async fn request_reset(&self, email: &str) -> Outcome<()> {
        let email = normalize_email(email);
        match self.credentials.check_user_exists(email).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(email, "Password reset requested for unknown e-mail");
                return Outcome::status(StatusCode::BadRequest);
            }
            Err(e) => {
                error!(email, error = %e, "Existence check failed");
                return Outcome::status(StatusCode::InternalServerError);
            }
        }

        let ticket = self.registry.issue(email);
        let mail = self.template.compose(email, ticket.code);

        match self.mailer.send(&mail).await {
            Ok(()) => {
                info!(email, expires_at = %ticket.expires_at, "Reset code sent");
                Outcome::status(StatusCode::Ok)
            }
            Err(e) => {
                self.registry.revoke(&ticket);
                error!(email, error = %e, "Failed to mail reset code, code revoked");
                Outcome::status(StatusCode::InternalServerError)
            }
        }
    }

    /// Consumes a code, returning a reset token bound to `email`.
    ///
    /// `BAD_REQUEST` if no live code matches.
    pub async fn verify_otp(&self, email: &str, code: u32) -> Outcome<String> {
        let email = normalize_email(email);
        if !self.registry.verify_and_consume(email, code) {
            warn!(email, "Invalid or expired reset code");
            return Outcome::status(StatusCode::BadRequest);
        }

        match self.credentials.issue_reset_token(email, code) {
            Ok(token) => Outcome::ok(token),
            Err(e) => {
                error!(email, error = %e, "Failed to sign reset token");
                Outcome::status(StatusCode::InternalServerError)
            }
        }
    }

    /// Spends `reset_token` on `new_password`.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        email: &str,
        new_password: &str,
    ) -> Outcome<()> {
        self.credentials
            .change_password(reset_token, email, new_password)
            .await
    }
}
