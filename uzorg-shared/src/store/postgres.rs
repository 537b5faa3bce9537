/// PostgreSQL-backed account store
///
/// Each trait method maps onto the model queries. Multi-row writes open a
/// transaction with `pool.begin()` and only `commit` once every row is in; any
/// early return drops the transaction, which rolls it back.
///
/// Constraint violations are translated by name, so callers see
/// [`StoreError::DuplicateEmail`] rather than a raw database error even when two
/// registrations race past the email pre-check.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{AccountStore, CredentialStore, MembershipStore, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::membership::{self, Membership};
use crate::models::organisation::Organisation;
use crate::models::user::User;

/// Unique constraint on `users.email`
const USERS_EMAIL_KEY: &str = "users_email_key";

/// Account store over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps constraint violations onto store errors; anything else stays a
/// database error
fn classify(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERS_EMAIL_KEY) => return StoreError::DuplicateEmail,
                Some(membership::PRIMARY_KEY) => return StoreError::DuplicateMembership,
                _ => {}
            }
        }

        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference;
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgAccountStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        user.insert(&self.pool).await.map_err(classify)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl MembershipStore for PgAccountStore {
    async fn create_user_with_default_org(
        &self,
        user: &User,
        org: &Organisation,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        user.insert(&mut *tx).await.map_err(classify)?;
        org.insert(&mut *tx).await.map_err(classify)?;
        Membership::insert(&mut *tx, org.id, user.id)
            .await
            .map_err(classify)?;

        tx.commit().await?;

        debug!(user_id = %user.id, org_id = %org.id, "Committed user with default organisation");
        Ok(())
    }

    async fn create_org_for_user(&self, org: &Organisation, user_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        org.insert(&mut *tx).await.map_err(classify)?;
        Membership::insert(&mut *tx, org.id, user_id)
            .await
            .map_err(classify)?;

        tx.commit().await?;

        debug!(user_id = %user_id, org_id = %org.id, "Committed organisation with first member");
        Ok(())
    }

    async fn add_user_to_org(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<()> {
        Membership::insert(&self.pool, org_id, user_id)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<bool> {
        Ok(Membership::exists(&self.pool, org_id, user_id).await?)
    }

    async fn orgs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Organisation>> {
        Ok(Organisation::list_by_user(&self.pool, user_id).await?)
    }

    async fn users_for_org(&self, org_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(User::list_by_org(&self.pool, org_id).await?)
    }

    async fn find_org(&self, org_id: Uuid) -> StoreResult<Option<Organisation>> {
        Ok(Organisation::find_by_id(&self.pool, org_id).await?)
    }

    async fn delete_org(&self, org_id: Uuid) -> StoreResult<bool> {
        Ok(Organisation::delete(&self.pool, org_id).await?)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
