/// Password hashing module using Argon2id
///
/// Passwords are hashed with Argon2id and stored as PHC strings, which embed the
/// algorithm, parameters and salt. Verification reads the parameters back out of
/// the stored hash, so changing [`HashParams`] never invalidates existing users.
///
/// Hashing is deliberately slow and CPU-bound. Async callers use
/// [`hash_password_blocking`] / [`verify_password_blocking`], which move the work
/// onto Tokio's blocking pool instead of stalling the runtime.
///
/// # Example
///
/// ```
/// use uzorg_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("super_secret_password_123")?;
///
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters used for new hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashParams {
    /// 64 MiB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashParams {
    /// Minimum-cost parameters for tests. Never use these in production.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(self.memory_kib)
            .t_cost(self.iterations)
            .p_cost(self.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes a password with the default [`HashParams`]
///
/// Returns a PHC string such as `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, &HashParams::default())
}

/// Hashes a password with explicit cost parameters
///
/// A fresh 16-byte salt is drawn from the OS RNG for every call.
pub fn hash_password_with(password: &str, params: &HashParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Uses Argon2's own constant-time verification. Returns `Ok(false)` for a wrong
/// password and [`PasswordError::InvalidHash`] when the stored hash is unusable:
/// unparseable, or a PHC string that carries no hash output.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // `$argon2id$<salt>` parses, but could never match any password
    if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash(
            "Hash has no salt or output".to_string(),
        ));
    }

    // Parameters come from the PHC string, not from the defaults
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// [`hash_password_with`] on Tokio's blocking pool
pub async fn hash_password_blocking(
    password: String,
    params: HashParams,
) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password_with(&password, &params))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

/// [`verify_password`] on Tokio's blocking pool
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_with_custom_params() {
        let hash = hash_password_with("pw", &HashParams::insecure_fast()).unwrap();
        assert!(hash.contains("m=8,t=1,p=1"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let params = HashParams::insecure_fast();
        let hash1 = hash_password_with("same_password", &params).unwrap();
        let hash2 = hash_password_with("same_password", &params).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password_with("plaintext-marker", &HashParams::insecure_fast()).unwrap();
        assert!(!hash.contains("plaintext-marker"));
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password_with("correct_password", &HashParams::insecure_fast()).unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_verify_password_truncated_hash() {
        let hash = hash_password_with("pw", &HashParams::insecure_fast()).unwrap();
        // Drop the output segment, keeping algorithm, params and salt
        let truncated = &hash[..hash.rfind('$').unwrap()];

        assert!(matches!(
            verify_password("pw", truncated),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = HashParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            hash_password_with("pw", &params),
            Err(PasswordError::HashError(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_wrappers_roundtrip() {
        let hash = hash_password_blocking("unicode-密码".to_string(), HashParams::insecure_fast())
            .await
            .unwrap();

        assert!(verify_password_blocking("unicode-密码".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("other".to_string(), hash).await.unwrap());
    }
}
