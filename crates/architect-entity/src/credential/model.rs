//! Credential entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user's authentication material and profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name given at registration.
    pub name: String,
    /// Unique e-mail address.
    pub email: String,
    /// Salted password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account has been granted access (e-mail confirmed).
    pub has_access: bool,
    /// Organisation the user belongs to.
    pub organisation: Option<String>,
    /// Department within the organisation.
    pub department: Option<String>,
    /// Assigned role, if any.
    pub role: Option<UserRole>,
    /// When the credential was created.
    pub created_at: DateTime<Utc>,
    /// When the credential was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Project the fields exposed to the rest of the application.
    pub fn position(&self) -> Position {
        Position {
            id: self.id,
            name: self.name.clone(),
            organisation: self.organisation.clone(),
            role: self.role,
            department: self.department.clone(),
        }
    }
}

/// Data required to create a new credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCredential {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// A user's standing within their organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub name: String,
    pub organisation: Option<String>,
    pub role: Option<UserRole>,
    pub department: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@college.edu".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            has_access: false,
            organisation: Some("St. Mary's".to_string()),
            department: Some("CSE".to_string()),
            role: Some(UserRole::Editor),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&credential).unwrap();
        assert!(json.get("password_hash").is_none());

        let position = credential.position();
        assert_eq!(position.department.as_deref(), Some("CSE"));
        assert_eq!(position.role, Some(UserRole::Editor));
    }
}
