/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store so the HTTP surface can be
/// exercised without PostgreSQL, and provides small JSON request helpers.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;
use uzorg_api::app::{build_router, AppState};
use uzorg_shared::accounts::AccountService;
use uzorg_shared::auth::jwt::TokenService;
use uzorg_shared::auth::password::HashParams;
use uzorg_shared::store::memory::MemoryStore;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "password123";

/// Test context holding the router and the store behind it
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenService,
}

/// A registered user as seen through the API
pub struct Registered {
    pub user_id: Uuid,
    pub token: String,
}

impl Registered {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(SECRET);
        let accounts = AccountService::new(store.clone(), tokens.clone())
            .with_hash_params(HashParams::insecure_fast());

        let app = build_router(AppState::new(accounts));

        Self { app, store, tokens }
    }

    /// Sends a request and returns the status with the decoded JSON body
    ///
    /// Empty bodies decode as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &Registered) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(&user.bearer()), None).await
    }

    pub async fn post(&self, uri: &str, user: &Registered, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&user.bearer()), Some(body))
            .await
    }

    /// Registers a user through the API and panics unless it succeeds
    pub async fn register(&self, first_name: &str, email: &str) -> Registered {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(register_body(first_name, email)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        Registered {
            user_id: body["data"]["user"]["userId"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .expect("userId in register response"),
            token: body["data"]["accessToken"]
                .as_str()
                .expect("accessToken in register response")
                .to_string(),
        }
    }

    /// Id of the first organisation listed for `user`
    pub async fn first_org_id(&self, user: &Registered) -> Uuid {
        let (status, body) = self.get("/api/organisations", user).await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["organisations"][0]["orgId"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("orgId in organisation list")
    }
}

pub fn register_body(first_name: &str, email: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": "Tester",
        "email": email,
        "password": PASSWORD,
        "phone": "+2348012345678",
    })
}
