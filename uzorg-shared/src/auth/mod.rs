/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and verification
/// - [`middleware`]: Bearer gate that resolves the caller's identity
/// - [`authorization`]: Membership checks for organisation-scoped operations
///
/// # Example
///
/// ```no_run
/// use uzorg_shared::auth::password::{hash_password, verify_password};
/// use uzorg_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::new("a-secret-of-at-least-thirty-two-bytes");
/// let token = tokens.issue(Uuid::new_v4())?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
