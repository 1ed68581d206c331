use crate::models::*;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use error_common::{PlatformError, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Storage for tenants; `(subdomain, domain)` is unique
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn insert(&self, account: &Account) -> Result<()>;
    async fn update(&self, account: &Account) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;
    async fn find_by_host(&self, subdomain: &str, domain: &str) -> Result<Option<Account>>;
    async fn list(&self) -> Result<Vec<Account>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Storage for people; `(account, username)` is unique
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn insert(&self, person: &Person) -> Result<()>;
    async fn update(&self, person: &Person) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>>;
    async fn find_by_username(&self, account_id: Uuid, username: &str) -> Result<Option<Person>>;
    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Person>>;
    async fn count_for_account(&self, account_id: Uuid) -> Result<u64>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Storage for groups; `(account, name)` is unique
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn insert(&self, group: &Group) -> Result<()>;
    async fn update(&self, group: &Group) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>>;
    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Group>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Storage for the global role vocabulary
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn insert(&self, role: &Role) -> Result<()>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
    async fn list(&self) -> Result<Vec<Role>>;
}

type HostKey = (String, String);
type ScopedKey = (Uuid, String);

/// In-memory account repository for testing and development
pub struct InMemoryAccountRepository {
    accounts: Arc<DashMap<Uuid, Account>>,
    hosts: Arc<DashMap<HostKey, Uuid>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            hosts: Arc::new(DashMap::new()),
        }
    }

    fn host_key(subdomain: &str, domain: &str) -> HostKey {
        (subdomain.to_lowercase(), domain.to_lowercase())
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<()> {
        match self.hosts.entry(Self::host_key(&account.subdomain, &account.domain)) {
            Entry::Occupied(_) => Err(PlatformError::conflict(format!(
                "account {} already exists",
                account.full_domain()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(account.id);
                self.accounts.insert(account.id, account.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, account: &Account) -> Result<()> {
        let previous = self
            .accounts
            .get(&account.id)
            .map(|entry| Self::host_key(&entry.subdomain, &entry.domain))
            .ok_or_else(|| PlatformError::not_found(format!("account {}", account.id)))?;

        let next = Self::host_key(&account.subdomain, &account.domain);
        if next != previous {
            match self.hosts.entry(next) {
                Entry::Occupied(_) => {
                    return Err(PlatformError::conflict(format!(
                        "account {} already exists",
                        account.full_domain()
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(account.id);
                }
            }
            self.hosts.remove(&previous);
        }

        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_host(&self, subdomain: &str, domain: &str) -> Result<Option<Account>> {
        let id = self
            .hosts
            .get(&Self::host_key(subdomain, domain))
            .map(|entry| *entry.value());
        Ok(id.and_then(|id| self.accounts.get(&id).map(|entry| entry.value().clone())))
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(accounts)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.hosts
                .remove(&Self::host_key(&account.subdomain, &account.domain));
        }
        Ok(())
    }
}

/// In-memory person repository for testing and development
pub struct InMemoryPersonRepository {
    people: Arc<DashMap<Uuid, Person>>,
    usernames: Arc<DashMap<ScopedKey, Uuid>>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self {
            people: Arc::new(DashMap::new()),
            usernames: Arc::new(DashMap::new()),
        }
    }

    fn username_key(account_id: Uuid, username: &str) -> ScopedKey {
        (account_id, username.to_string())
    }
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn insert(&self, person: &Person) -> Result<()> {
        match self
            .usernames
            .entry(Self::username_key(person.account_id, &person.username))
        {
            Entry::Occupied(_) => Err(PlatformError::conflict(format!(
                "username {} already taken",
                person.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(person.id);
                self.people.insert(person.id, person.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, person: &Person) -> Result<()> {
        let previous = self
            .people
            .get(&person.id)
            .map(|entry| Self::username_key(entry.account_id, &entry.username))
            .ok_or_else(|| PlatformError::not_found(format!("person {}", person.id)))?;

        let next = Self::username_key(person.account_id, &person.username);
        if next != previous {
            match self.usernames.entry(next) {
                Entry::Occupied(_) => {
                    return Err(PlatformError::conflict(format!(
                        "username {} already taken",
                        person.username
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(person.id);
                }
            }
            self.usernames.remove(&previous);
        }

        self.people.insert(person.id, person.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>> {
        Ok(self.people.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_username(&self, account_id: Uuid, username: &str) -> Result<Option<Person>> {
        let id = self
            .usernames
            .get(&Self::username_key(account_id, username))
            .map(|entry| *entry.value());
        Ok(id.and_then(|id| self.people.get(&id).map(|entry| entry.value().clone())))
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Person>> {
        let mut people: Vec<Person> = self
            .people
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .map(|entry| entry.value().clone())
            .collect();
        people.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(people)
    }

    async fn count_for_account(&self, account_id: Uuid) -> Result<u64> {
        let count = self
            .people
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if let Some((_, person)) = self.people.remove(&id) {
            self.usernames
                .remove(&Self::username_key(person.account_id, &person.username));
        }
        Ok(())
    }
}

/// In-memory group repository for testing and development
pub struct InMemoryGroupRepository {
    groups: Arc<DashMap<Uuid, Group>>,
    names: Arc<DashMap<ScopedKey, Uuid>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self {
            groups: Arc::new(DashMap::new()),
            names: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryGroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn insert(&self, group: &Group) -> Result<()> {
        match self.names.entry((group.account_id, group.name.clone())) {
            Entry::Occupied(_) => Err(PlatformError::conflict(format!(
                "group {} already exists",
                group.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(group.id);
                self.groups.insert(group.id, group.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, group: &Group) -> Result<()> {
        let previous = self
            .groups
            .get(&group.id)
            .map(|entry| (entry.account_id, entry.name.clone()))
            .ok_or_else(|| PlatformError::not_found(format!("group {}", group.id)))?;

        let next = (group.account_id, group.name.clone());
        if next != previous {
            match self.names.entry(next) {
                Entry::Occupied(_) => {
                    return Err(PlatformError::conflict(format!(
                        "group {} already exists",
                        group.name
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(group.id);
                }
            }
            self.names.remove(&previous);
        }

        self.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        Ok(self.groups.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .map(|entry| entry.value().clone())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if let Some((_, group)) = self.groups.remove(&id) {
            self.names.remove(&(group.account_id, group.name));
        }
        Ok(())
    }
}

/// In-memory role repository for testing and development
pub struct InMemoryRoleRepository {
    roles: Arc<DashMap<String, Role>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self {
            roles: Arc::new(DashMap::new()),
        }
    }

    /// Repository pre-seeded with the given role names
    pub fn with_roles<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = Self::new();
        for name in names {
            let role = Role::new(name);
            repo.roles.insert(role.name.clone(), role);
        }
        repo
    }
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn insert(&self, role: &Role) -> Result<()> {
        match self.roles.entry(role.name.clone()) {
            Entry::Occupied(_) => Err(PlatformError::conflict(format!(
                "role {} already exists",
                role.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(role.clone());
                Ok(())
            }
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.roles.get(name).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self.roles.iter().map(|entry| entry.value().clone()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_account_host_is_unique() {
        let repo = InMemoryAccountRepository::new();
        let first = Account::new("acme", "example.com", "Acme", 0);
        repo.insert(&first).await.unwrap();

        let clash = Account::new("ACME", "example.com", "Other", 0);
        let err = repo.insert(&clash).await.unwrap_err();
        assert!(err.is_conflict());

        let found = repo.find_by_host("acme", "EXAMPLE.COM").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_account_update_moves_host_index() {
        let repo = InMemoryAccountRepository::new();
        let mut account = Account::new("acme", "example.com", "Acme", 0);
        repo.insert(&account).await.unwrap();

        account.subdomain = "acme2".to_string();
        repo.update(&account).await.unwrap();

        assert!(repo.find_by_host("acme", "example.com").await.unwrap().is_none());
        assert!(repo.find_by_host("acme2", "example.com").await.unwrap().is_some());

        repo.delete(account.id).await.unwrap();
        assert!(repo.find_by_host("acme2", "example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_unique_per_account() {
        let repo = InMemoryPersonRepository::new();
        let account_a = Uuid::new_v4();
        let account_b = Uuid::new_v4();

        repo.insert(&Person::new(account_a, "bob", "bob@a.com")).await.unwrap();
        repo.insert(&Person::new(account_b, "bob", "bob@b.com")).await.unwrap();
        assert!(repo
            .insert(&Person::new(account_a, "bob", "other@a.com"))
            .await
            .unwrap_err()
            .is_conflict());

        assert_eq!(repo.count_for_account(account_a).await.unwrap(), 1);
        assert!(repo.find_by_username(account_b, "bob").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_group_and_role_uniqueness() {
        let groups = InMemoryGroupRepository::new();
        let account = Uuid::new_v4();
        groups.insert(&Group::new(account, "staff")).await.unwrap();
        assert!(groups.insert(&Group::new(account, "staff")).await.is_err());
        groups.insert(&Group::new(Uuid::new_v4(), "staff")).await.unwrap();

        let roles = InMemoryRoleRepository::with_roles(["account_admin"]);
        assert!(roles.insert(&Role::new("account_admin")).await.is_err());
        assert!(roles.find_by_name("account_admin").await.unwrap().is_some());
    }
}
