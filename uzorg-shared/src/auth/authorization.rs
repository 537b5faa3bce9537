/// Authorization checks for organisation-scoped operations
///
/// The bearer gate only proves who is calling. Whether the caller may touch a
/// given organisation or user is decided here, and always before any of the
/// target's data is read.
///
/// # Permission Model
///
/// There is a single level: a user may act on an organisation iff a row for
/// the pair exists in `org_users`. There are no roles. A user may read only
/// their own profile.
///
/// # Example
///
/// ```no_run
/// use uzorg_shared::auth::authorization::require_membership;
/// use uzorg_shared::auth::middleware::AuthContext;
/// use uzorg_shared::store::MembershipStore;
/// use uuid::Uuid;
///
/// async fn load_org(
///     store: &dyn MembershipStore,
///     auth: &AuthContext,
///     org_id: Uuid,
/// ) -> Result<(), Box<dyn std::error::Error>> {
///     require_membership(store, auth, org_id).await?;
///     // safe to read the organisation now
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::store::{MembershipStore, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not a member of the organisation
    #[error("Not a member of organisation {0}")]
    NotMember(Uuid),

    /// Caller is acting on a resource that isn't theirs
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// Membership lookup failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Requires the caller to belong to `org_id`
///
/// Reads committed membership state on every call; nothing is cached.
pub async fn require_membership<S>(
    store: &S,
    caller: &AuthContext,
    org_id: Uuid,
) -> Result<(), AuthzError>
where
    S: MembershipStore + ?Sized,
{
    if !store.is_member(caller.user_id, org_id).await? {
        return Err(AuthzError::NotMember(org_id));
    }

    Ok(())
}

/// Requires the caller to be `user_id`
pub fn require_self(caller: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if caller.user_id != user_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}
