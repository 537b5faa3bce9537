/// Membership relation between users and organisations
///
/// `org_users` is the only record of who belongs where. There is no cached
/// copy anywhere else, so [`Membership::exists`] always reads committed state.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE org_users (
///     org_id UUID NOT NULL REFERENCES orgs(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT org_users_pkey PRIMARY KEY (org_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use uzorg_shared::models::membership::Membership;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, org_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// Membership::insert(&pool, org_id, user_id).await?;
/// assert!(Membership::exists(&pool, org_id, user_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Name of the primary key constraint on `org_users`
pub const PRIMARY_KEY: &str = "org_users_pkey";

/// A single (organisation, user) membership row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Membership {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Adds a user to an organisation
    ///
    /// # Errors
    ///
    /// - unique violation on [`PRIMARY_KEY`] if the pair already exists
    /// - foreign key violation if either side doesn't exist
    pub async fn insert<'e, E>(executor: E, org_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO org_users (org_id, user_id)
            VALUES ($1, $2)
            RETURNING org_id, user_id, created_at
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Checks whether `user_id` belongs to `org_id`
    pub async fn exists<'e, E>(executor: E, org_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM org_users
                WHERE org_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Counts the members of an organisation
    pub async fn count_by_org<'e, E>(executor: E, org_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM org_users WHERE org_id = $1")
            .bind(org_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}
