/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use uzorg_api::{app::{build_router, AppState}, config::Config};
/// use uzorg_shared::{
///     accounts::AccountService,
///     auth::jwt::TokenService,
///     db::pool::{create_pool, DatabaseConfig},
///     store::postgres::PgAccountStore,
/// };
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let accounts = AccountService::new(
///     Arc::new(PgAccountStore::new(pool)),
///     TokenService::new(&config.jwt.secret),
/// );
/// let app = build_router(AppState::new(accounts));
/// # Ok(())
/// # }
/// ```

use crate::routes;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uzorg_shared::{accounts::AccountService, auth::middleware::bearer_auth_middleware};

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; everything inside is
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Account operations over the configured store
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }
}

/// Builds the complete Axum router
///
/// ```text
/// /
/// ├── GET  /health
/// ├── /auth/                              # public
/// │   ├── POST /register
/// │   └── POST /login
/// └── /api/                               # bearer token required
///     ├── GET  /users/:id
///     ├── GET  /organisations
///     ├── POST /organisations
///     ├── GET  /organisations/:org_id
///     ├── GET  /organisations/:org_id/users
///     └── POST /organisations/:org_id/users
/// ```
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let api_routes = Router::new()
        .route("/users/:id", get(routes::users::get_user))
        .route(
            "/organisations",
            get(routes::organisations::list_organisations)
                .post(routes::organisations::create_organisation),
        )
        .route(
            "/organisations/:org_id",
            get(routes::organisations::get_organisation),
        )
        .route(
            "/organisations/:org_id/users",
            get(routes::organisations::list_organisation_users)
                .post(routes::organisations::add_organisation_user),
        )
        .layer(middleware::from_fn_with_state(
            state.accounts.tokens().clone(),
            bearer_auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
