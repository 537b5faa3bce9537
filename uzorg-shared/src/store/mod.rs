/// Persistence traits for users, organisations and memberships
///
/// The account operations talk to storage only through these traits, held as an
/// `Arc<dyn AccountStore>`. Two backends implement them:
///
/// - [`postgres::PgAccountStore`]: sqlx over PostgreSQL; every multi-row
///   mutation runs in one transaction
/// - [`memory::MemoryStore`]: a single mutex-guarded state, for tests and
///   local development
///
/// # Atomicity
///
/// `create_user_with_default_org` and `create_org_for_user` write several rows.
/// Either all of them become visible or none do. A PostgreSQL transaction that
/// is dropped before `commit` (including when the caller's future is cancelled)
/// rolls back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::password::{
    hash_password_blocking, verify_password_blocking, HashParams, PasswordError,
};
use crate::models::organisation::Organisation;
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email (compared case-insensitively) already exists
    #[error("Email is already registered")]
    DuplicateEmail,

    /// The (organisation, user) pair is already present
    #[error("Membership already exists")]
    DuplicateMembership,

    /// A user or organisation with this id is already stored
    #[error("Record {0} already exists")]
    DuplicateId(Uuid),

    /// A foreign key points at a user or organisation that doesn't exist
    #[error("Referenced record does not exist")]
    MissingReference,

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User records and password checks
///
/// Knows nothing about organisations.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists a user whose password is already hashed
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Removes a user and, by cascade, all of their memberships
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    /// Hashes `password` off the async runtime, then persists the user
    ///
    /// The plaintext is dropped once hashed and is never stored or logged.
    async fn create_user(
        &self,
        profile: NewUser,
        password: &str,
        params: &HashParams,
    ) -> StoreResult<User> {
        let hash = hash_password_blocking(password.to_owned(), *params).await?;
        let user = User::new(profile, hash);
        self.insert_user(&user).await?;

        Ok(user)
    }

    /// Constant-time check of `candidate` against a stored PHC hash
    ///
    /// A wrong candidate is `Ok(false)`; an unusable stored hash is
    /// [`StoreError::Password`].
    async fn verify_password(&self, candidate: &str, stored_hash: &str) -> StoreResult<bool> {
        let ok = verify_password_blocking(candidate.to_owned(), stored_hash.to_owned()).await?;
        Ok(ok)
    }
}

/// Organisations and the user-organisation relation
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Inserts the user, the organisation and their membership atomically
    async fn create_user_with_default_org(
        &self,
        user: &User,
        org: &Organisation,
    ) -> StoreResult<()>;

    /// Inserts the organisation and makes `user_id` its first member atomically
    ///
    /// Fails with [`StoreError::MissingReference`] if the user doesn't exist.
    async fn create_org_for_user(&self, org: &Organisation, user_id: Uuid) -> StoreResult<()>;

    /// Adds one membership
    ///
    /// A pair that already exists fails with [`StoreError::DuplicateMembership`];
    /// a missing user or organisation with [`StoreError::MissingReference`].
    async fn add_user_to_org(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<()>;

    async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<bool>;

    /// Organisations `user_id` belongs to, oldest first
    async fn orgs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Organisation>>;

    /// Members of `org_id` in the order they joined
    async fn users_for_org(&self, org_id: Uuid) -> StoreResult<Vec<User>>;

    async fn find_org(&self, org_id: Uuid) -> StoreResult<Option<Organisation>>;

    /// Removes an organisation and, by cascade, its memberships
    async fn delete_org(&self, org_id: Uuid) -> StoreResult<bool>;
}

/// Everything the account operations need from storage
#[async_trait]
pub trait AccountStore: CredentialStore + MembershipStore {
    /// Liveness check behind `/health`
    async fn ping(&self) -> StoreResult<()>;
}
