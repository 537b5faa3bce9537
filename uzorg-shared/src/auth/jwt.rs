/// Bearer token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying the user ID as subject and a fixed
/// 24-hour lifetime. They are never persisted; a token is valid exactly when its
/// signature checks out against the configured secret and its expiry lies in the
/// future.
///
/// # Security
///
/// - **Algorithm**: HS256 only. Tokens declaring any other algorithm are
///   rejected before their signature is even considered.
/// - **Expiry**: checked against an explicit clock with zero leeway.
/// - **Claims**: strongly typed; a missing or mistyped `sub`/`exp` is a
///   malformed token, never a default value.
/// - **Secret**: loaded once at startup and injected, never read from ambient state.
///
/// # Example
///
/// ```
/// use uzorg_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!");
/// let user_id = Uuid::new_v4();
///
/// let token = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of every issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token could not be parsed or lacks required claims
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not match, or the token uses an unexpected algorithm
    #[error("Invalid token signature")]
    BadSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration time (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued at `now` and expiring `ttl` later
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks expiry against an explicit clock
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Issues and verifies bearer tokens with a single process-wide secret
///
/// Cloning is cheap enough to hand a copy to every request handler.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service with the standard 24-hour lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates a token service with a custom lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token for `subject`, valid from now
    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, now, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its subject
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Verifies a token against an explicit clock
    ///
    /// Pure in `(token, now, secret)`: no I/O and no ambient time.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now`, not the system clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingAlgorithm => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if token_data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_720_000_000, 0).unwrap()
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, t0(), Duration::hours(24));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(!claims.is_expired_at(t0()));
        assert!(claims.is_expired_at(t0() + Duration::hours(24)));
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id).expect("Should create token");
        assert_eq!(tokens.verify(&token).expect("Should verify"), user_id);
    }

    #[test]
    fn test_verify_at_within_lifetime() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = tokens.issue_at(user_id, t0()).unwrap();

        let claims = tokens
            .verify_at(&token, t0() + Duration::hours(23))
            .expect("Token should still be valid");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iat, t0().timestamp());
    }

    #[test]
    fn test_verify_expired_token() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue_at(Uuid::new_v4(), t0()).unwrap();

        let at_expiry = tokens.verify_at(&token, t0() + Duration::hours(24));
        assert!(matches!(at_expiry, Err(TokenError::Expired)));

        let after = tokens.verify_at(&token, t0() + Duration::hours(24) + Duration::seconds(1));
        assert!(matches!(after, Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_with_system_clock_rejects_old_token() {
        let tokens = TokenService::new(SECRET);
        let token = tokens
            .issue_at(Uuid::new_v4(), Utc::now() - Duration::days(2))
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = TokenService::new(SECRET).issue(Uuid::new_v4()).unwrap();
        let other = TokenService::new("another-secret-key-at-least-32-bytes");

        assert!(matches!(other.verify(&token), Err(TokenError::BadSignature)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(Uuid::new_v4()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let idx = payload.len() / 2;
        let replacement = if &payload[idx..idx + 1] == "A" { "B" } else { "A" };
        payload.replace_range(idx..idx + 1, replacement);
        let tampered = parts.join(".");

        assert!(matches!(tokens.verify(&tampered), Err(TokenError::BadSignature)));
    }

    #[test]
    fn test_unexpected_algorithm_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = TokenService::new(SECRET).verify(&token);
        assert!(matches!(result, Err(TokenError::BadSignature)));
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject {
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = TokenService::new(SECRET).verify(&token);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = TokenService::new(SECRET);

        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::Malformed(_))));
        assert!(matches!(tokens.verify(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_custom_ttl() {
        let tokens = TokenService::with_ttl(SECRET, Duration::minutes(5));
        let token = tokens.issue_at(Uuid::new_v4(), t0()).unwrap();

        assert!(tokens.verify_at(&token, t0() + Duration::minutes(4)).is_ok());
        assert!(matches!(
            tokens.verify_at(&token, t0() + Duration::minutes(5)),
            Err(TokenError::Expired)
        ));
    }
}
