//! # Uzorg API Server
//!
//! ```bash
//! UZORG_DB_URL=postgresql://localhost/uzorg \
//! UZORG_JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p uzorg-api
//! ```

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uzorg_api::{
    app::{build_router, AppState},
    config::Config,
};
use uzorg_shared::{
    accounts::AccountService,
    auth::jwt::TokenService,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::postgres::PgAccountStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "uzorg_api=debug,uzorg_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Uzorg API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let accounts = AccountService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        TokenService::new(&config.jwt.secret),
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(accounts));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
