/// Organisation model and database operations
///
/// An organisation has no owner column. Who belongs to it is recorded only in
/// `org_users`, so every write path that creates an organisation also inserts
/// its first membership inside the same transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE orgs (
///     id UUID PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// An organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    /// Unique organisation ID (UUID v4)
    #[serde(rename = "orgId")]
    pub id: Uuid,

    pub name: String,

    pub description: String,

    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Input for creating an organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganisation {
    pub name: String,
    pub description: String,
}

impl NewOrganisation {
    /// The organisation every user receives at registration
    pub fn default_for(first_name: &str) -> Self {
        Self {
            name: format!("{}'s Organisation", first_name),
            description: format!("Default organisation for {}", first_name),
        }
    }
}

impl Organisation {
    /// Builds a not-yet-persisted organisation with a fresh ID
    pub fn new(data: NewOrganisation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            created_at: Utc::now(),
        }
    }

    /// Inserts this organisation
    pub async fn insert<'e, E>(&self, executor: E) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO orgs (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Finds an organisation by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let org = sqlx::query_as::<_, Organisation>(
            r#"
            SELECT id, name, description, created_at
            FROM orgs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(org)
    }

    /// Lists the organisations a user belongs to, in creation order
    pub async fn list_by_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let orgs = sqlx::query_as::<_, Organisation>(
            r#"
            SELECT o.id, o.name, o.description, o.created_at
            FROM orgs o
            INNER JOIN org_users ou ON ou.org_id = o.id
            WHERE ou.user_id = $1
            ORDER BY o.created_at ASC, o.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(orgs)
    }

    /// Deletes an organisation; its memberships cascade
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM orgs WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
