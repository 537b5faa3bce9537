/// User model and database operations
///
/// Users are created once at registration and never updated afterwards. They
/// join organisations through the `org_users` relation (see
/// [`membership`](super::membership)).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL CONSTRAINT users_email_key UNIQUE,
///     phone VARCHAR(32) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use uzorg_shared::models::user::{NewUser, User};
/// use uzorg_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let profile = NewUser {
///     first_name: "Ann".to_string(),
///     last_name: "Lee".to_string(),
///     email: "ann@example.com".to_string(),
///     phone: "+2348012345678".to_string(),
/// };
///
/// let user = User::new(profile, "$argon2id$...".to_string());
/// user.insert(&pool).await?;
///
/// let found = User::find_by_email(&pool, "ANN@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// A registered user account
///
/// Not serializable: the only outward view is [`UserProfile`], which has no
/// password hash field.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    /// Email address, unique and case-insensitive (CITEXT)
    pub email: String,

    /// Phone number in E.164 form
    pub phone: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Profile fields supplied at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Presentation view of a [`User`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
        }
    }
}

impl User {
    /// Builds a not-yet-persisted user with a fresh ID
    ///
    /// `password_hash` must already be a PHC string; plaintext never reaches
    /// this type.
    pub fn new(profile: NewUser, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Inserts this user
    ///
    /// Fails with a unique violation on constraint `users_email_key` when the
    /// email is taken (compared case-insensitively).
    pub async fn insert<'e, E>(&self, executor: E) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, phone, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(&self.password_hash)
        .bind(self.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Finds a user by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Lookup is case-insensitive via the CITEXT column type.
    pub async fn find_by_email<'e, E>(
        executor: E,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Lists the members of an organisation, oldest membership first
    pub async fn list_by_org<'e, E>(executor: E, org_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.email, u.phone,
                   u.password_hash, u.created_at
            FROM users u
            INNER JOIN org_users ou ON ou.user_id = u.id
            WHERE ou.org_id = $1
            ORDER BY ou.created_at ASC, u.id ASC
            "#,
        )
        .bind(org_id)
        .fetch_all(executor)
        .await?;

        Ok(users)
    }

    /// Deletes a user by ID
    ///
    /// Memberships are removed by `ON DELETE CASCADE`. Returns false if the
    /// user didn't exist.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
