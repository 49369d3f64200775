//! Credential repository trait and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use architect_core::error::{AppError, ErrorKind};
use architect_core::result::AppResult;
use architect_entity::credential::{CreateCredential, Credential, UserRole};

/// Point lookups and single-row writes against the credential store.
///
/// E-mail comparisons are case-insensitive.
#[async_trait]
pub trait CredentialRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a credential by e-mail.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>>;

    /// Find a credential by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Credential>>;

    /// Insert a new credential with access disabled.
    ///
    /// Fails with [`ErrorKind::Conflict`] if the e-mail is taken.
    async fn create(&self, new: &CreateCredential) -> AppResult<Credential>;

    /// Replace the password hash of the credential owning `email`.
    ///
    /// Fails with [`ErrorKind::NotFound`] if no row matches.
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> AppResult<()>;

    /// Set the access flag of the credential owning `email`.
    async fn set_access(&self, email: &str, has_access: bool) -> AppResult<()>;

    /// Assign organisation, department and role.
    async fn update_position(
        &self,
        email: &str,
        organisation: Option<&str>,
        department: Option<&str>,
        role: Option<UserRole>,
    ) -> AppResult<()>;
}

/// PostgreSQL-backed credential repository.
#[derive(Debug, Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

fn require_row(rows_affected: u64, email: &str) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::not_found(format!("No credential for '{email}'")));
    }
    Ok(())
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find credential by email"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find credential by id"))
    }

    async fn create(&self, new: &CreateCredential) -> AppResult<Credential> {
        let now = Utc::now();
        sqlx::query_as::<_, Credential>(
            r#"INSERT INTO users (id, name, email, password_hash, has_access, created_at, updated_at)
               VALUES ($1, $2, $3, $4, FALSE, $5, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::with_source(
                ErrorKind::Conflict,
                format!("Email '{}' is already registered", new.email),
                e,
            ),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create credential", e),
        })
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password hash"))?;

        require_row(result.rows_affected(), email)
    }

    async fn set_access(&self, email: &str, has_access: bool) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET has_access = $2, updated_at = $3 WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .bind(has_access)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update access flag"))?;

        require_row(result.rows_affected(), email)
    }

    async fn update_position(
        &self,
        email: &str,
        organisation: Option<&str>,
        department: Option<&str>,
        role: Option<UserRole>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"UPDATE users
               SET organisation = $2, department = $3, role = $4, updated_at = $5
               WHERE LOWER(email) = LOWER($1)"#,
        )
        .bind(email)
        .bind(organisation)
        .bind(department)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update position"))?;

        require_row(result.rows_affected(), email)
    }
}
