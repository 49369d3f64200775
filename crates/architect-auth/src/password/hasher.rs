//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use architect_core::error::AppError;

/// Hashes and checks passwords with a per-password random salt.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the library's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a plaintext password into a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Checks a plaintext password against a stored PHC string.
    ///
    /// A mismatch is `Ok(false)`; an unparsable hash is an error.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.hash_password("Timetable@2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("Timetable@2024", &hash).unwrap());
        assert!(!hasher.verify_password("timetable@2024", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(cheap().verify_password("pw", "not-a-hash").is_err());
    }
}
