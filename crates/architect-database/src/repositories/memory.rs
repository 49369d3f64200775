//! In-memory credential repository for tests and local tooling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use architect_core::error::AppError;
use architect_core::result::AppResult;
use architect_entity::credential::{CreateCredential, Credential, UserRole};

use super::credential::CredentialRepository;

/// Credential repository kept in a process-local map.
///
/// [`set_unavailable`](Self::set_unavailable) makes every call fail with a
/// database error, which lets callers exercise their store-failure paths.
#[derive(Debug, Default)]
pub struct MemoryCredentialRepository {
    rows: RwLock<HashMap<Uuid, Credential>>,
    unavailable: AtomicBool,
}

impl MemoryCredentialRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored credentials.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("Credential store unavailable"));
        }
        Ok(())
    }

    async fn modify<F>(&self, email: &str, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut Credential) + Send,
    {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .values_mut()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| AppError::not_found(format!("No credential for '{email}'")))?;
        apply(row);
        row.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        self.check_available()?;
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Credential>> {
        self.check_available()?;
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, new: &CreateCredential) -> AppResult<Credential> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        if rows
            .values()
            .any(|c| c.email.eq_ignore_ascii_case(&new.email))
        {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                new.email
            )));
        }

        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            has_access: false,
            organisation: None,
            department: None,
            role: None,
            created_at: now,
            updated_at: now,
        };
        rows.insert(credential.id, credential.clone());
        Ok(credential)
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let password_hash = password_hash.to_string();
        self.modify(email, move |c| c.password_hash = password_hash)
            .await
    }

    async fn set_access(&self, email: &str, has_access: bool) -> AppResult<()> {
        self.modify(email, move |c| c.has_access = has_access).await
    }

    async fn update_position(
        &self,
        email: &str,
        organisation: Option<&str>,
        department: Option<&str>,
        role: Option<UserRole>,
    ) -> AppResult<()> {
        let organisation = organisation.map(String::from);
        let department = department.map(String::from);
        self.modify(email, move |c| {
            c.organisation = organisation;
            c.department = department;
            c.role = role;
        })
        .await
    }
}
