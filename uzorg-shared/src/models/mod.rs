/// Database models for Uzorg
///
/// Each model owns its SQL. Operations are generic over [`sqlx::PgExecutor`] so
/// the same query runs against the pool or inside a transaction.
///
/// # Models
///
/// - `user`: User accounts and their presentation profile
/// - `organisation`: Organisations
/// - `membership`: The user-organisation relation
///
/// # Example
///
/// ```no_run
/// use uzorg_shared::models::organisation::{NewOrganisation, Organisation};
/// use uzorg_shared::models::membership::Membership;
/// use uzorg_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let mut tx = pool.begin().await?;
/// let org = Organisation::new(NewOrganisation::default_for("Ann"));
/// org.insert(&mut *tx).await?;
/// Membership::insert(&mut *tx, org.id, user_id).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod organisation;
pub mod user;
