//! Credential service: registration, login, token checks, and password changes.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use architect_auth::jwt::{Claims, SpentTokenLedger, TokenSigner, TokenType, TokenVerifier};
use architect_auth::password::PasswordHasher;
use architect_core::config::AuthConfig;
use architect_core::error::AppError;
use architect_core::traits::Clock;
use architect_core::{AppResult, Outcome, StatusCode};
use architect_database::repositories::CredentialRepository;
use architect_entity::credential::{CreateCredential, Position, UserRole};

use crate::outcome::respond;

/// Owns every mutation of stored credentials.
#[derive(Debug, Clone)]
pub struct CredentialService {
    /// Credential store.
    repo: Arc<dyn CredentialRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    signer: TokenSigner,
    verifier: TokenVerifier,
    /// Redeemed reset tokens.
    spent: SpentTokenLedger,
}

impl CredentialService {
    /// Creates a new credential service.
    pub fn new(
        repo: Arc<dyn CredentialRepository>,
        hasher: Arc<PasswordHasher>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Ok(Self {
            repo,
            hasher,
            signer: TokenSigner::new(config, Arc::clone(&clock))?,
            verifier: TokenVerifier::new(config, clock),
            spent: SpentTokenLedger::new(config)?,
        })
    }

    /// Whether `token` is a valid, unexpired session token.
    ///
    /// Never fails: every verification error reads as `false`.
    pub fn verify_token(&self, token: &str) -> bool {
        match self.verifier.verify_kind(token, TokenType::Session) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                false
            }
        }
    }

    /// Logs a user in, returning a session token.
    ///
    /// `NOT_FOUND` for an unknown e-mail, `UNAUTHORIZED` for a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Outcome<String> {
        respond(
            "authenticate",
            self.try_authenticate(email, password).await,
            Outcome::ok,
        )
    }

    async fn try_authenticate(&self, email: &str, password: &str) -> AppResult<String> {
        let email = normalize_email(email);
        let credential = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No credential for '{email}'")))?;

        if !self
            .hasher
            .verify_password(password, &credential.password_hash)?
        {
            return Err(AppError::authentication("Password does not match"));
        }

        let token = self.signer.sign_session(credential.id, &credential.email)?;
        info!(user_id = %credential.id, "User authenticated");
        Ok(token)
    }

    /// Registers a new user with access disabled, returning a session token.
    ///
    /// `CONFLICT` if the e-mail is already registered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Outcome<String> {
        respond(
            "register",
            self.try_register(name, email, password).await,
            Outcome::created,
        )
    }

    async fn try_register(&self, name: &str, email: &str, password: &str) -> AppResult<String> {
        validate_registration(name, email, password)?;
        let email = normalize_email(email);

        if self.repo.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email '{email}' is already registered"
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        // A concurrent registration can still win the unique index; the
        // repository reports that as a conflict too.
        let credential = self
            .repo
            .create(&CreateCredential {
                name: name.trim().to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %credential.id, email = %credential.email, "User registered");
        self.signer.sign_session(credential.id, &credential.email)
    }

    /// Sets a new password using a reset token.
    ///
    /// Any token problem is `BAD_REQUEST`. Any persistence problem,
    /// including an e-mail with no credential, is `INTERNAL_SERVER_ERROR`.
    /// A token that succeeds once is spent.
    pub async fn change_password(
        &self,
        reset_token: &str,
        email: &str,
        new_password: &str,
    ) -> Outcome<()> {
        let email = normalize_email(email);
        let claims = match self.redeemable_reset_claims(reset_token, email, new_password) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(email, error = %e, "Reset token rejected");
                return Outcome::status(StatusCode::BadRequest);
            }
        };

        if !self.spent.claim(claims.jti).await {
            warn!(email, jti = %claims.jti, "Reset token replayed");
            return Outcome::status(StatusCode::BadRequest);
        }

        match self.store_password(email, new_password).await {
            Ok(()) => {
                info!(email, "Password changed");
                Outcome::status(StatusCode::Ok)
            }
            Err(e) => {
                // The password did not change, so the token stays usable.
                self.spent.release(claims.jti).await;
                error!(email, error = %e, "Failed to persist new password");
                Outcome::status(StatusCode::InternalServerError)
            }
        }
    }

    fn redeemable_reset_claims(
        &self,
        reset_token: &str,
        email: &str,
        new_password: &str,
    ) -> AppResult<Claims> {
        let claims = self
            .verifier
            .verify_kind(reset_token, TokenType::PasswordReset)?;

        if !claims.email().eq_ignore_ascii_case(email) {
            return Err(AppError::validation(
                "Reset token was issued for a different e-mail",
            ));
        }
        if new_password.is_empty() {
            return Err(AppError::validation("New password cannot be empty"));
        }

        Ok(claims)
    }

    async fn store_password(&self, email: &str, new_password: &str) -> AppResult<()> {
        let password_hash = self.hasher.hash_password(new_password)?;
        self.repo.update_password_hash(email, &password_hash).await
    }

    /// Grants access to the account a verification link was issued for.
    ///
    /// `false` on any token or store failure, and when access was already
    /// granted.
    pub async fn verify_email_link(&self, token: &str) -> bool {
        match self.try_verify_email_link(token).await {
            Ok(granted) => granted,
            Err(e) => {
                warn!(error = %e, "E-mail verification failed");
                false
            }
        }
    }

    async fn try_verify_email_link(&self, token: &str) -> AppResult<bool> {
        let claims = self.verifier.verify(token)?;
        if !matches!(
            claims.token_type,
            TokenType::Session | TokenType::EmailVerification
        ) {
            return Err(AppError::validation(
                "Token cannot be used to verify an e-mail",
            ));
        }

        let email = claims.email();
        let Some(credential) = self.repo.find_by_email(email).await? else {
            return Err(AppError::not_found(format!("No credential for '{email}'")));
        };

        if credential.has_access {
            debug!(user_id = %credential.id, "Access already granted");
            return Ok(false);
        }

        self.repo.set_access(&credential.email, true).await?;
        info!(user_id = %credential.id, "E-mail verified, access granted");
        Ok(true)
    }

    /// Signs a reset token for a code that has just been verified.
    pub fn issue_reset_token(&self, email: &str, code: u32) -> AppResult<String> {
        self.signer.sign_reset(normalize_email(email), code)
    }

    /// Signs a token for an e-mail verification link.
    pub fn email_verification_token(&self, email: &str) -> AppResult<String> {
        self.signer.sign_email_verification(normalize_email(email))
    }

    /// Whether a credential exists for `email`.
    pub async fn check_user_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .repo
            .find_by_email(normalize_email(email))
            .await?
            .is_some())
    }

    /// Resolves the organisation, department and role of the token's user.
    ///
    /// `NOT_FOUND` if the user is gone, `BAD_REQUEST` if the stored e-mail no
    /// longer matches the token, `UNAUTHORIZED` until access is granted.
    pub async fn get_position(&self, token: &str) -> Outcome<Position> {
        respond(
            "get_position",
            self.try_get_position(token).await,
            Outcome::ok,
        )
    }

    async fn try_get_position(&self, token: &str) -> AppResult<Position> {
        let claims = self.verifier.verify_kind(token, TokenType::Session)?;
        let user_id = claims
            .uid
            .ok_or_else(|| AppError::validation("Session token carries no user id"))?;

        let credential = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if !credential.email.eq_ignore_ascii_case(claims.email()) {
            return Err(AppError::validation(
                "Token e-mail does not match the stored credential",
            ));
        }
        if !credential.has_access {
            return Err(AppError::authentication("Access has not been granted"));
        }

        Ok(credential.position())
    }

    /// Assigns organisation, department and role to the user owning `email`.
    pub async fn assign_position(
        &self,
        email: &str,
        organisation: Option<&str>,
        department: Option<&str>,
        role: Option<UserRole>,
    ) -> Outcome<()> {
        let email = normalize_email(email);
        let result = self
            .repo
            .update_position(email, organisation, department, role)
            .await;
        if result.is_ok() {
            info!(email, ?role, "Position assigned");
        }
        respond("assign_position", result, |()| {
            Outcome::status(StatusCode::Ok)
        })
    }
}

/// The canonical form of a user-supplied e-mail address.
///
/// Surrounding whitespace is dropped. Case is kept as typed; every lookup
/// compares case-insensitively.
pub(crate) fn normalize_email(email: &str) -> &str {
    email.trim()
}

fn validate_registration(name: &str, email: &str, password: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    if password.is_empty() {
        return Err(AppError::validation("Password cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::traits::ManualClock;
    use architect_database::MemoryCredentialRepository;
    use chrono::Duration;
    use uuid::Uuid;

    struct Fixture {
        repo: Arc<MemoryCredentialRepository>,
        clock: Arc<ManualClock>,
        service: CredentialService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryCredentialRepository::new());
        let clock = Arc::new(ManualClock::default());
        let config = AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let service = CredentialService::new(
            repo.clone(),
            Arc::new(PasswordHasher::with_params(1024, 1, 1).unwrap()),
            &config,
            clock.clone(),
        )
        .unwrap();
        Fixture {
            repo,
            clock,
            service,
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let f = fixture();

        let created = f
            .service
            .register("Asha", "asha@college.edu", "Timetable@1")
            .await;
        assert_eq!(created.status, StatusCode::Created);
        assert!(f.service.verify_token(created.payload.as_deref().unwrap()));

        let login = f
            .service
            .authenticate("asha@college.edu", "Timetable@1")
            .await;
        assert_eq!(login.status, StatusCode::Ok);
        assert!(f.service.verify_token(&login.into_payload().unwrap()));

        let stored = f.repo.find_by_email("asha@college.edu").await.unwrap().unwrap();
        assert!(!stored.has_access);
        assert_ne!(stored.password_hash, "Timetable@1");
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let f = fixture();
        let first = f.service.register("A", "dup@college.edu", "pw").await;
        let second = f.service.register("B", "DUP@college.edu", "pw2").await;

        assert_eq!(first.status, StatusCode::Created);
        assert_eq!(second.status, StatusCode::Conflict);
        assert!(second.payload.is_none());
        assert_eq!(f.repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_padded_email_is_normalized_everywhere() {
        let f = fixture();
        let created = f.service.register("A", " padded@college.edu ", "pw").await;
        assert_eq!(created.status, StatusCode::Created);
        assert!(f.repo.find_by_email("padded@college.edu").await.unwrap().is_some());

        for email in ["padded@college.edu", " padded@college.edu", "PADDED@college.edu\t"] {
            assert_eq!(f.service.authenticate(email, "pw").await.status, StatusCode::Ok);
            assert!(f.service.check_user_exists(email).await.unwrap());
        }
        assert_eq!(
            f.service.register("B", "padded@college.edu  ", "pw").await.status,
            StatusCode::Conflict
        );
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let f = fixture();
        assert_eq!(
            f.service.register("", "a@b.c", "pw").await.status,
            StatusCode::BadRequest
        );
        assert_eq!(
            f.service.register("A", "not-an-email", "pw").await.status,
            StatusCode::BadRequest
        );
        assert_eq!(
            f.service.register("A", "a@b.c", "").await.status,
            StatusCode::BadRequest
        );
    }

    #[tokio::test]
    async fn test_authenticate_statuses() {
        let f = fixture();
        f.service.register("A", "a@college.edu", "right").await;

        let wrong = f.service.authenticate("a@college.edu", "wrong").await;
        assert_eq!(wrong.status, StatusCode::Unauthorized);
        assert!(wrong.payload.is_none());

        let missing = f.service.authenticate("ghost@college.edu", "right").await;
        assert_eq!(missing.status, StatusCode::NotFound);

        f.repo.set_unavailable(true);
        let down = f.service.authenticate("a@college.edu", "right").await;
        assert_eq!(down.status, StatusCode::InternalServerError);
    }

    #[tokio::test]
    async fn test_verify_token_never_fails() {
        let f = fixture();
        assert!(!f.service.verify_token(""));
        assert!(!f.service.verify_token("a.b.c"));

        let reset = f.service.issue_reset_token("a@b.c", 123456).unwrap();
        assert!(!f.service.verify_token(&reset));

        let token = f
            .service
            .register("A", "a@b.c", "pw")
            .await
            .into_payload()
            .unwrap();
        f.clock.advance(Duration::hours(25));
        assert!(!f.service.verify_token(&token));
    }

    #[tokio::test]
    async fn test_change_password_with_reset_token() {
        let f = fixture();
        f.service.register("A", "a@b.c", "old").await;
        let token = f.service.issue_reset_token("a@b.c", 111111).unwrap();

        let changed = f.service.change_password(&token, "a@b.c", "new").await;
        assert_eq!(changed.status, StatusCode::Ok);
        assert_eq!(
            f.service.authenticate("a@b.c", "new").await.status,
            StatusCode::Ok
        );
        assert_eq!(
            f.service.authenticate("a@b.c", "old").await.status,
            StatusCode::Unauthorized
        );

        let replay = f.service.change_password(&token, "a@b.c", "newer").await;
        assert_eq!(replay.status, StatusCode::BadRequest);
    }

    #[tokio::test]
    async fn test_change_password_rejects_bad_tokens() {
        let f = fixture();
        f.service.register("A", "a@b.c", "old").await;

        let garbage = f.service.change_password("garbage", "a@b.c", "new").await;
        assert_eq!(garbage.status, StatusCode::BadRequest);

        let session = f.service.authenticate("a@b.c", "old").await.into_payload().unwrap();
        let wrong_kind = f.service.change_password(&session, "a@b.c", "new").await;
        assert_eq!(wrong_kind.status, StatusCode::BadRequest);

        let other = f.service.issue_reset_token("other@b.c", 222222).unwrap();
        let wrong_email = f.service.change_password(&other, "a@b.c", "new").await;
        assert_eq!(wrong_email.status, StatusCode::BadRequest);

        let expiring = f.service.issue_reset_token("a@b.c", 333333).unwrap();
        f.clock.advance(Duration::minutes(11));
        let expired = f.service.change_password(&expiring, "a@b.c", "new").await;
        assert_eq!(expired.status, StatusCode::BadRequest);

        assert_eq!(
            f.service.authenticate("a@b.c", "old").await.status,
            StatusCode::Ok
        );
    }

    #[tokio::test]
    async fn test_change_password_for_unknown_email_is_internal_error() {
        let f = fixture();
        let token = f.service.issue_reset_token("ghost@b.c", 444444).unwrap();

        let outcome = f.service.change_password(&token, "ghost@b.c", "pw").await;
        assert_eq!(outcome.status, StatusCode::InternalServerError);
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_token_usable() {
        let f = fixture();
        f.service.register("A", "a@b.c", "old").await;
        let token = f.service.issue_reset_token("a@b.c", 555555).unwrap();

        f.repo.set_unavailable(true);
        let failed = f.service.change_password(&token, "a@b.c", "new").await;
        assert_eq!(failed.status, StatusCode::InternalServerError);

        f.repo.set_unavailable(false);
        let retried = f.service.change_password(&token, "a@b.c", "new").await;
        assert_eq!(retried.status, StatusCode::Ok);
    }

    #[tokio::test]
    async fn test_verify_email_link_grants_access_once() {
        let f = fixture();
        f.service.register("A", "a@b.c", "pw").await;
        let link = f.service.email_verification_token("a@b.c").unwrap();

        assert!(f.service.verify_email_link(&link).await);
        assert!(!f.service.verify_email_link(&link).await);
        assert!(f.repo.find_by_email("a@b.c").await.unwrap().unwrap().has_access);
    }

    #[tokio::test]
    async fn test_verify_email_link_failures_are_false() {
        let f = fixture();
        assert!(!f.service.verify_email_link("garbage").await);

        let unknown = f.service.email_verification_token("ghost@b.c").unwrap();
        assert!(!f.service.verify_email_link(&unknown).await);

        let reset = f.service.issue_reset_token("ghost@b.c", 666666).unwrap();
        assert!(!f.service.verify_email_link(&reset).await);
    }

    #[tokio::test]
    async fn test_check_user_exists() {
        let f = fixture();
        f.service.register("A", "a@b.c", "pw").await;

        assert!(f.service.check_user_exists("a@b.c").await.unwrap());
        assert!(!f.service.check_user_exists("z@b.c").await.unwrap());

        f.repo.set_unavailable(true);
        assert!(f.service.check_user_exists("a@b.c").await.is_err());
    }

    #[tokio::test]
    async fn test_get_position_requires_access() {
        let f = fixture();
        let token = f
            .service
            .register("Asha", "asha@college.edu", "pw")
            .await
            .into_payload()
            .unwrap();

        assert_eq!(
            f.service.get_position(&token).await.status,
            StatusCode::Unauthorized
        );

        assert!(f.service.verify_email_link(&token).await);
        let assigned = f
            .service
            .assign_position(
                "asha@college.edu",
                Some("St. Mary's"),
                Some("CSE"),
                Some(UserRole::Editor),
            )
            .await;
        assert_eq!(assigned.status, StatusCode::Ok);

        let position = f.service.get_position(&token).await.into_payload().unwrap();
        assert_eq!(position.name, "Asha");
        assert_eq!(position.organisation.as_deref(), Some("St. Mary's"));
        assert_eq!(position.department.as_deref(), Some("CSE"));
        assert_eq!(position.role, Some(UserRole::Editor));
    }

    #[tokio::test]
    async fn test_get_position_for_missing_user() {
        let f = fixture();
        let config = AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let signer = TokenSigner::new(&config, f.clock.clone()).unwrap();
        let token = signer.sign_session(Uuid::new_v4(), "ghost@b.c").unwrap();

        assert_eq!(
            f.service.get_position(&token).await.status,
            StatusCode::NotFound
        );
        assert_eq!(
            f.service.get_position("garbage").await.status,
            StatusCode::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_get_position_with_mismatched_email() {
        let f = fixture();
        let credential = f
            .repo
            .create(&CreateCredential {
                name: "A".to_string(),
                email: "a@b.c".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        let config = AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let token = TokenSigner::new(&config, f.clock.clone())
            .unwrap()
            .sign_session(credential.id, "someone-else@b.c")
            .unwrap();

        assert_eq!(
            f.service.get_position(&token).await.status,
            StatusCode::BadRequest
        );
    }

    #[tokio::test]
    async fn test_assign_position_unknown_user() {
        let f = fixture();
        let outcome = f
            .service
            .assign_position("ghost@b.c", None, None, Some(UserRole::Viewer))
            .await;
        assert_eq!(outcome.status, StatusCode::NotFound);
    }
}
