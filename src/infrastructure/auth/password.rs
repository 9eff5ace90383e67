use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashing for private room passwords.
///
/// New hashes are Argon2. Rooms imported from the previous backend may still
/// carry bcrypt hashes, which verify but are never produced.
pub struct PasswordService;

impl PasswordService {
    /// Hash a room password using Argon2
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Check a join attempt against the stored hash
    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        if hash.starts_with("$argon2") {
            let parsed =
                PasswordHash::new(hash).map_err(|e| PasswordError::Verify(e.to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok());
        }

        if hash.starts_with("$2") {
            return bcrypt::verify(password, hash).map_err(|e| PasswordError::Verify(e.to_string()));
        }

        Err(PasswordError::UnknownFormat)
    }

    /// `hash` on the blocking pool, keeping Argon2 off the async workers
    pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))?
    }

    /// `verify` on the blocking pool
    pub async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::Verify(e.to_string()))?
    }

    /// Legacy bcrypt hash that should be replaced on the next password change
    pub fn is_legacy(hash: &str) -> bool {
        hash.starts_with("$2")
    }
}

/// Password error types
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Failed to verify password: {0}")]
    Verify(String),
    #[error("Unknown hash format")]
    UnknownFormat,
}
