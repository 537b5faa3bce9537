/// In-memory account store
///
/// One mutex guards all state, so each trait call is a single atomic step.
/// Multi-row writes check every precondition before touching anything, so a
/// failed call leaves no partial state. Emails compare case-insensitively, as
/// the `CITEXT` column does in PostgreSQL.
///
/// # Example
///
/// ```
/// use uzorg_shared::store::memory::MemoryStore;
/// use uzorg_shared::store::MembershipStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// assert!(!store.is_member(Uuid::new_v4(), Uuid::new_v4()).await?);
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AccountStore, CredentialStore, MembershipStore, StoreError, StoreResult};
use crate::models::organisation::Organisation;
use crate::models::user::User;

#[derive(Debug, Clone)]
struct MemberRow {
    org_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    orgs: HashMap<Uuid, Organisation>,
    /// Insertion order doubles as join order
    members: Vec<MemberRow>,
}

impl State {
    fn email_taken(&self, email: &str) -> bool {
        let wanted = email.to_lowercase();
        self.users.values().any(|u| u.email.to_lowercase() == wanted)
    }

    fn has_member(&self, org_id: Uuid, user_id: Uuid) -> bool {
        self.members
            .iter()
            .any(|m| m.org_id == org_id && m.user_id == user_id)
    }

    fn push_member(&mut self, org_id: Uuid, user_id: Uuid) {
        self.members.push(MemberRow {
            org_id,
            user_id,
            created_at: Utc::now(),
        });
    }

    fn check_new_user(&self, user: &User) -> StoreResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(StoreError::DuplicateId(user.id));
        }
        if self.email_taken(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        Ok(())
    }

    fn check_new_org(&self, org: &Organisation) -> StoreResult<()> {
        if self.orgs.contains_key(&org.id) {
            return Err(StoreError::DuplicateId(org.id));
        }
        Ok(())
    }
}

/// Account store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of membership rows for `org_id`
    pub fn member_count(&self, org_id: Uuid) -> usize {
        self.lock().members.iter().filter(|m| m.org_id == org_id).count()
    }

    /// Total number of users
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Total number of organisations
    pub fn org_count(&self) -> usize {
        self.lock().orgs.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Writes validate before mutating, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_new_user(user)?;
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let wanted = email.to_lowercase();
        let state = self.lock();
        Ok(state
            .users
            .values()
            .find(|u| u.email.to_lowercase() == wanted)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        let removed = state.users.remove(&id).is_some();
        state.members.retain(|m| m.user_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn create_user_with_default_org(
        &self,
        user: &User,
        org: &Organisation,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_new_user(user)?;
        state.check_new_org(org)?;

        state.users.insert(user.id, user.clone());
        state.orgs.insert(org.id, org.clone());
        state.push_member(org.id, user.id);
        Ok(())
    }

    async fn create_org_for_user(&self, org: &Organisation, user_id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        state.check_new_org(org)?;
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference);
        }

        state.orgs.insert(org.id, org.clone());
        state.push_member(org.id, user_id);
        Ok(())
    }

    async fn add_user_to_org(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.users.contains_key(&user_id) || !state.orgs.contains_key(&org_id) {
            return Err(StoreError::MissingReference);
        }
        if state.has_member(org_id, user_id) {
            return Err(StoreError::DuplicateMembership);
        }

        state.push_member(org_id, user_id);
        Ok(())
    }

    async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> StoreResult<bool> {
        Ok(self.lock().has_member(org_id, user_id))
    }

    async fn orgs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Organisation>> {
        let state = self.lock();
        let mut orgs: Vec<Organisation> = state
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| state.orgs.get(&m.org_id).cloned())
            .collect();
        orgs.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(orgs)
    }

    async fn users_for_org(&self, org_id: Uuid) -> StoreResult<Vec<User>> {
        let state = self.lock();
        let mut rows: Vec<&MemberRow> = state
            .members
            .iter()
            .filter(|m| m.org_id == org_id)
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows
            .into_iter()
            .filter_map(|m| state.users.get(&m.user_id).cloned())
            .collect())
    }

    async fn find_org(&self, org_id: Uuid) -> StoreResult<Option<Organisation>> {
        Ok(self.lock().orgs.get(&org_id).cloned())
    }

    async fn delete_org(&self, org_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        let removed = state.orgs.remove(&org_id).is_some();
        state.members.retain(|m| m.org_id != org_id);
        Ok(removed)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        let _state = self.lock();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashParams;
    use crate::models::organisation::NewOrganisation;
    use crate::models::user::NewUser;

    fn user(first: &str, email: &str) -> User {
        User::new(
            NewUser {
                first_name: first.to_string(),
                last_name: "Tester".to_string(),
                email: email.to_string(),
                phone: "+15550000000".to_string(),
            },
            "$argon2id$placeholder".to_string(),
        )
    }

    fn org(name: &str) -> Organisation {
        Organisation::new(NewOrganisation {
            name: name.to_string(),
            description: format!("{} description", name),
        })
    }

    #[tokio::test]
    async fn test_create_user_with_default_org() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        let default_org = Organisation::new(NewOrganisation::default_for("Ann"));

        store
            .create_user_with_default_org(&ann, &default_org)
            .await
            .unwrap();

        assert_eq!(store.user_count(), 1);
        assert_eq!(store.org_count(), 1);
        assert_eq!(store.member_count(default_org.id), 1);
        assert!(store.is_member(ann.id, default_org.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_leaves_no_trace() {
        let store = MemoryStore::new();
        let first = user("Ann", "ann@example.com");
        store
            .create_user_with_default_org(&first, &org("A"))
            .await
            .unwrap();

        let second = user("Other", "ANN@Example.com");
        let second_org = org("B");
        let result = store.create_user_with_default_org(&second, &second_org).await;

        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
        assert_eq!(store.user_count(), 1);
        assert_eq!(store.org_count(), 1);
        assert!(store.find_org(second_org.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_org_insert_rolls_back_user() {
        let store = MemoryStore::new();
        let existing = org("Taken");
        store
            .create_user_with_default_org(&user("Ann", "ann@example.com"), &existing)
            .await
            .unwrap();

        let bob = user("Bob", "bob@example.com");
        let result = store.create_user_with_default_org(&bob, &existing).await;

        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == existing.id));
        assert!(store.find_user_by_id(bob.id).await.unwrap().is_none());
        assert_eq!(store.member_count(existing.id), 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_id_rejected() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        store.insert_user(&ann).await.unwrap();

        let mut twin = user("Twin", "twin@example.com");
        twin.id = ann.id;

        assert!(matches!(
            store.insert_user(&twin).await,
            Err(StoreError::DuplicateId(id)) if id == ann.id
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_find_user_by_email_is_case_insensitive() {
        let store = MemoryStore::new();
        let ann = user("Ann", "Ann@Example.com");
        store.insert_user(&ann).await.unwrap();

        let found = store.find_user_by_email("ann@example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(ann.id));
        assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let store = MemoryStore::new();
        let created = store
            .create_user(
                NewUser {
                    first_name: "Ann".to_string(),
                    last_name: "Lee".to_string(),
                    email: "ann@example.com".to_string(),
                    phone: "+15550000000".to_string(),
                },
                "correct horse",
                &HashParams::insecure_fast(),
            )
            .await
            .unwrap();

        assert!(created.password_hash.starts_with("$argon2id$"));
        assert!(!created.password_hash.contains("correct horse"));
        assert!(store
            .verify_password("correct horse", &created.password_hash)
            .await
            .unwrap());
        assert!(!store
            .verify_password("battery staple", &created.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_org_for_unknown_user() {
        let store = MemoryStore::new();
        let new_org = org("Ghost");

        let result = store.create_org_for_user(&new_org, Uuid::new_v4()).await;

        assert!(matches!(result, Err(StoreError::MissingReference)));
        assert_eq!(store.org_count(), 0);
    }

    #[tokio::test]
    async fn test_add_user_to_org_twice() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        let bob = user("Bob", "bob@example.com");
        let team = org("Team");
        store.create_user_with_default_org(&ann, &team).await.unwrap();
        store.insert_user(&bob).await.unwrap();

        store.add_user_to_org(bob.id, team.id).await.unwrap();
        let again = store.add_user_to_org(bob.id, team.id).await;

        assert!(matches!(again, Err(StoreError::DuplicateMembership)));
        assert_eq!(store.member_count(team.id), 2);
    }

    #[tokio::test]
    async fn test_add_user_to_missing_org() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        store.insert_user(&ann).await.unwrap();

        let result = store.add_user_to_org(ann.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::MissingReference)));
    }

    #[tokio::test]
    async fn test_deletes_cascade_to_memberships() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        let bob = user("Bob", "bob@example.com");
        let team = org("Team");
        store.create_user_with_default_org(&ann, &team).await.unwrap();
        store.insert_user(&bob).await.unwrap();
        store.add_user_to_org(bob.id, team.id).await.unwrap();

        assert!(store.delete_user(bob.id).await.unwrap());
        assert!(!store.is_member(bob.id, team.id).await.unwrap());
        assert!(!store.delete_user(bob.id).await.unwrap());

        assert!(store.delete_org(team.id).await.unwrap());
        assert!(!store.is_member(ann.id, team.id).await.unwrap());
        assert!(store.orgs_for_user(ann.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_order() {
        let store = MemoryStore::new();
        let ann = user("Ann", "ann@example.com");
        let bob = user("Bob", "bob@example.com");
        let first = org("First");
        store.create_user_with_default_org(&ann, &first).await.unwrap();
        store.insert_user(&bob).await.unwrap();
        store.add_user_to_org(bob.id, first.id).await.unwrap();

        let mut second = org("Second");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        store.create_org_for_user(&second, ann.id).await.unwrap();

        let names: Vec<String> = store
            .orgs_for_user(ann.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);

        let members: Vec<Uuid> = store
            .users_for_org(first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(members, vec![ann.id, bob.id]);
    }
}
