/// Schema migrations
///
/// Migrations live in `uzorg-shared/migrations/` and are embedded into the
/// binary at compile time with `sqlx::migrate!`. Each one is a reversible
/// `{version}_{name}.up.sql` / `.down.sql` pair.
///
/// The initial migration enables `citext`, which the `users.email` column needs
/// for case-insensitive uniqueness.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies every pending migration
///
/// A failing migration is rolled back and reported; earlier ones stay applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations complete");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Creates the database named in `database_url` if it doesn't exist yet
///
/// Meant for development and test setups; production databases are
/// provisioned ahead of time.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
    } else {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}
