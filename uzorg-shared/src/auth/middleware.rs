/// Bearer authentication gate for Axum
///
/// Every protected call passes through [`authenticate`] before any business
/// logic runs:
///
/// ```text
/// no Authorization header         -> MissingCredentials
/// header not visible ASCII        -> InvalidFormat
/// header without "Bearer " prefix -> InvalidFormat
/// bearer token fails verification -> InvalidToken
/// bearer token past its expiry    -> TokenExpired
/// otherwise                       -> AuthContext { user_id }
/// ```
///
/// Rejections never touch the store and never log the presented token.
/// On success the middleware inserts the [`AuthContext`] into the request
/// extensions, where handlers read it with Axum's `Extension` extractor.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use uzorg_shared::auth::jwt::TokenService;
/// use uzorg_shared::auth::middleware::{bearer_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(tokens, bearer_auth_middleware));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{TokenError, TokenService};

/// Resolved caller identity attached to each authenticated request
///
/// Read-only for the remainder of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user ID (token subject)
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context for a verified subject
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for the authentication gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Authorization header is required")]
    MissingCredentials,

    /// Header present but not a bearer credential
    #[error("Invalid authorization format: {0}")]
    InvalidFormat(String),

    /// Token failed verification
    #[error("Invalid token")]
    InvalidToken(#[source] TokenError),

    /// Token signature is valid but it has expired
    #[error("Token expired")]
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let body = Json(json!({
            "status": "Bad Request",
            "message": self.to_string(),
            "statusCode": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Runs the gate against a raw `Authorization` header value
pub fn authenticate(
    authorization: Option<&str>,
    tokens: &TokenService,
) -> Result<AuthContext, AuthError> {
    let header_value = authorization.ok_or(AuthError::MissingCredentials)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let user_id = tokens.verify(token.trim()).map_err(|e| match e {
        TokenError::Expired => AuthError::TokenExpired,
        other => AuthError::InvalidToken(other),
    })?;

    Ok(AuthContext::new(user_id))
}

/// Reads the `Authorization` header
///
/// A header that is present but not visible ASCII is `InvalidFormat`, not
/// missing.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|value| {
            value.to_str().map_err(|_| {
                AuthError::InvalidFormat("Header contains invalid characters".to_string())
            })
        })
        .transpose()
}

/// Bearer authentication middleware
///
/// Rejects with 401 unless the request carries a valid, unexpired bearer token.
/// Wire it with `axum::middleware::from_fn_with_state(tokens, bearer_auth_middleware)`.
pub async fn bearer_auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authorization_header(req.headers())
        .and_then(|authorization| authenticate(authorization, &tokens))
        .map_err(|e| {
            tracing::debug!(reason = %e, "Rejected unauthenticated request");
            e
        })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
