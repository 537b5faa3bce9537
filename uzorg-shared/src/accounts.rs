/// Account operations
///
/// [`AccountService`] is the one place where credentials, tokens and membership
/// meet. Every operation that acts for a logged-in user takes the caller's
/// [`AuthContext`] explicitly; nothing is read from ambient state.
///
/// # Operations
///
/// | Operation | Caller | Checks |
/// |---|---|---|
/// | `register` | anyone | email not taken |
/// | `login` | anyone | email exists and password verifies |
/// | `get_user` | authenticated | caller is the user |
/// | `create_org` / `list_orgs` | authenticated | none |
/// | `get_org` / `list_org_users` | authenticated | caller is a member |
/// | `add_member` | authenticated | caller is a member, target user exists |
///
/// Membership is checked before any organisation data is read, so a
/// non-member learns nothing about an organisation beyond "forbidden".
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use uzorg_shared::accounts::AccountService;
/// use uzorg_shared::auth::jwt::TokenService;
/// use uzorg_shared::auth::password::HashParams;
/// use uzorg_shared::models::user::NewUser;
/// use uzorg_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let accounts = AccountService::new(
///     Arc::new(MemoryStore::new()),
///     TokenService::new("your-secret-key-at-least-32-bytes!"),
/// )
/// .with_hash_params(HashParams::insecure_fast());
///
/// let profile = NewUser {
///     first_name: "Ann".to_string(),
///     last_name: "Lee".to_string(),
///     email: "ann@example.com".to_string(),
///     phone: "+2348012345678".to_string(),
/// };
/// let session = accounts.register(profile, "a-long-password").await?;
/// let again = accounts.login("ann@example.com", "a-long-password").await?;
/// assert_eq!(session.user, again.user);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::auth::authorization::{require_membership, require_self, AuthzError};
use crate::auth::jwt::{TokenError, TokenService};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{hash_password_blocking, HashParams, PasswordError};
use crate::models::organisation::{NewOrganisation, Organisation};
use crate::models::user::{NewUser, User, UserProfile};
use crate::store::{AccountStore, CredentialStore, MembershipStore, StoreError};

/// Error type for account operations
///
/// `Display` strings are safe to show to clients. Internal failures are logged
/// where they are converted; [`AccountError::Internal`] carries no detail.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("You are not allowed to access this resource")]
    AuthorizationFailed,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("User is already a member of this organisation")]
    AlreadyMember,

    #[error("Internal server error")]
    Internal,
}

pub type AccountResult<T> = Result<T, AccountError>;

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AccountError::DuplicateEmail,
            StoreError::DuplicateMembership => AccountError::AlreadyMember,
            other => {
                error!(error = %other, "Store operation failed");
                AccountError::Internal
            }
        }
    }
}

impl From<AuthzError> for AccountError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) | AuthzError::NotAuthorized => {
                AccountError::AuthorizationFailed
            }
            AuthzError::Store(e) => e.into(),
        }
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        error!(error = %err, "Token issuance failed");
        AccountError::Internal
    }
}

impl From<PasswordError> for AccountError {
    fn from(err: PasswordError) -> Self {
        error!(error = %err, "Password hashing failed");
        AccountError::Internal
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserProfile,
}

/// Orchestrates the credential store, token service and membership store
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    tokens: TokenService,
    hash_params: HashParams,
}

impl AccountService {
    /// Creates the service with production hashing parameters
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens,
            hash_params: HashParams::default(),
        }
    }

    /// Overrides the Argon2id cost used for new hashes
    pub fn with_hash_params(mut self, hash_params: HashParams) -> Self {
        self.hash_params = hash_params;
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }

    /// Registers a user together with their default organisation
    ///
    /// User, organisation and membership are committed as one unit. The email
    /// pre-check gives the common case a cheap answer; a registration racing
    /// past it still fails with [`AccountError::DuplicateEmail`] via the unique
    /// constraint.
    pub async fn register(&self, profile: NewUser, password: &str) -> AccountResult<AuthSession> {
        if self.store.find_user_by_email(&profile.email).await?.is_some() {
            debug!("Registration rejected: email already registered");
            return Err(AccountError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(password.to_owned(), self.hash_params).await?;

        let org = Organisation::new(NewOrganisation::default_for(&profile.first_name));
        let user = User::new(profile, password_hash);

        self.store.create_user_with_default_org(&user, &org).await?;

        let access_token = self.tokens.issue(user.id)?;

        info!(user_id = %user.id, org_id = %org.id, "Registered user");

        Ok(AuthSession {
            access_token,
            user: user.into(),
        })
    }

    /// Verifies credentials and issues a token
    ///
    /// An unknown email still pays for one Argon2id hash, so both failure paths
    /// take about as long and return the same error.
    pub async fn login(&self, email: &str, password: &str) -> AccountResult<AuthSession> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            let _ = hash_password_blocking(password.to_owned(), self.hash_params).await;
            debug!(reason = "unknown_email", "Login failed");
            return Err(AccountError::AuthenticationFailed);
        };

        if !self.store.verify_password(password, &user.password_hash).await? {
            debug!(user_id = %user.id, reason = "wrong_password", "Login failed");
            return Err(AccountError::AuthenticationFailed);
        }

        let access_token = self.tokens.issue(user.id)?;

        info!(user_id = %user.id, "User logged in");

        Ok(AuthSession {
            access_token,
            user: user.into(),
        })
    }

    /// Reads a profile; callers may only read their own
    pub async fn get_user(&self, caller: &AuthContext, user_id: Uuid) -> AccountResult<UserProfile> {
        require_self(caller, user_id)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound("User"))?;

        Ok(user.into())
    }

    /// Creates an organisation with the caller as its first member
    pub async fn create_org(
        &self,
        caller: &AuthContext,
        data: NewOrganisation,
    ) -> AccountResult<Organisation> {
        let org = Organisation::new(data);

        match self.store.create_org_for_user(&org, caller.user_id).await {
            Ok(()) => {}
            // Token outlived its user
            Err(StoreError::MissingReference) => return Err(AccountError::NotFound("User")),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %caller.user_id, org_id = %org.id, "Created organisation");
        Ok(org)
    }

    /// Organisations the caller belongs to
    pub async fn list_orgs(&self, caller: &AuthContext) -> AccountResult<Vec<Organisation>> {
        Ok(self.store.orgs_for_user(caller.user_id).await?)
    }

    /// Reads one organisation the caller belongs to
    pub async fn get_org(&self, caller: &AuthContext, org_id: Uuid) -> AccountResult<Organisation> {
        require_membership(self.store.as_ref(), caller, org_id).await?;

        self.store
            .find_org(org_id)
            .await?
            .ok_or(AccountError::NotFound("Organisation"))
    }

    /// Lists the members of an organisation the caller belongs to
    pub async fn list_org_users(
        &self,
        caller: &AuthContext,
        org_id: Uuid,
    ) -> AccountResult<Vec<UserProfile>> {
        require_membership(self.store.as_ref(), caller, org_id).await?;

        let users = self.store.users_for_org(org_id).await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Adds `user_id` to an organisation the caller belongs to
    ///
    /// Adding an existing member fails with [`AccountError::AlreadyMember`];
    /// concurrent duplicate adds produce exactly one row.
    pub async fn add_member(
        &self,
        caller: &AuthContext,
        org_id: Uuid,
        user_id: Uuid,
    ) -> AccountResult<()> {
        require_membership(self.store.as_ref(), caller, org_id).await?;

        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AccountError::NotFound("User"));
        }

        match self.store.add_user_to_org(user_id, org_id).await {
            Ok(()) => {}
            // User or organisation deleted since the checks above
            Err(StoreError::MissingReference) => return Err(AccountError::NotFound("User")),
            Err(e) => return Err(e.into()),
        }

        info!(
            caller_id = %caller.user_id,
            user_id = %user_id,
            org_id = %org_id,
            "Added user to organisation"
        );
        Ok(())
    }
}
