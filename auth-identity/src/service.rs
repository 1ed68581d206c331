use crate::{config::*, error::*, models::*, repository::*};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use auth_roles::RoleExpression;
use config_engine::{PathSettings, SubscriptionCatalog};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Split a `Host` header into `(subdomain, domain)`
///
/// The first label is the subdomain and the remainder the domain; a port is
/// ignored. Hosts without a dot carry no tenant.
pub fn parse_host(host: &str) -> Option<(String, String)> {
    let host = host.trim();
    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };

    let (subdomain, domain) = without_port.split_once('.')?;
    if subdomain.is_empty() || domain.is_empty() {
        return None;
    }
    Some((subdomain.to_lowercase(), domain.to_lowercase()))
}

pub struct IdentityService {
    accounts: Arc<dyn AccountRepository>,
    people: Arc<dyn PersonRepository>,
    groups: Arc<dyn GroupRepository>,
    roles: Arc<dyn RoleRepository>,
    config: IdentityConfig,
    argon2: Argon2<'static>,
}

impl IdentityService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        people: Arc<dyn PersonRepository>,
        groups: Arc<dyn GroupRepository>,
        roles: Arc<dyn RoleRepository>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            accounts,
            people,
            groups,
            roles,
            config,
            argon2: Argon2::default(),
        }
    }

    /// Look up the tenant addressed by a `Host` header
    pub async fn resolve_tenant(&self, host: &str) -> Result<Option<Account>> {
        let Some((subdomain, domain)) = parse_host(host) else {
            return Ok(None);
        };
        let account = self.accounts.find_by_host(&subdomain, &domain).await?;
        tracing::debug!(
            host = host,
            account_id = ?account.as_ref().map(|a| a.id),
            "resolved tenant"
        );
        Ok(account)
    }

    /// Load a person only if they belong to `account`
    pub async fn find_person(&self, account: &Account, person_id: Uuid) -> Result<Option<Person>> {
        let person = self.people.find_by_id(person_id).await?;
        Ok(person.filter(|person| person.account_id == account.id))
    }

    /// Build a person with a hashed password without persisting it
    pub fn prepare_person(&self, account_id: Uuid, request: NewPerson) -> Result<Person> {
        let mut person = Person::new(account_id, request.username, request.email);
        person.first_name = request.first_name;
        person.last_name = request.last_name;
        self.set_password(&mut person, &request.password)?;
        Ok(person)
    }

    pub async fn create_person(&self, account_id: Uuid, request: NewPerson) -> Result<Person> {
        let person = self.prepare_person(account_id, request)?;
        self.people.insert(&person).await?;

        tracing::info!(account_id = %account_id, person_id = %person.id, "person created");
        Ok(person)
    }

    /// Return the person when the credentials match, `None` otherwise
    pub async fn authenticate(
        &self,
        account: &Account,
        username: &str,
        password: &str,
    ) -> Result<Option<Person>> {
        let Some(person) = self.people.find_by_username(account.id, username).await? else {
            tracing::debug!(account_id = %account.id, "login for unknown username");
            return Ok(None);
        };

        if self.check_password(&person, password) {
            Ok(Some(person))
        } else {
            tracing::debug!(account_id = %account.id, person_id = %person.id, "password mismatch");
            Ok(None)
        }
    }

    /// Hash `raw` with a fresh salt into `person`
    pub fn set_password(&self, person: &mut Person, raw: &str) -> Result<()> {
        self.validate_password(raw)?;
        person.password_hash = self.hash_password(raw)?;
        Ok(())
    }

    pub fn check_password(&self, person: &Person, raw: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&person.password_hash) else {
            return false;
        };
        self.argon2
            .verify_password(raw.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Replace the password with a random one and return the plaintext
    pub async fn reset_password(&self, person_id: Uuid) -> Result<(Person, String)> {
        let mut person = self
            .people
            .find_by_id(person_id)
            .await?
            .ok_or(IdentityError::PersonNotFound)?;

        let new_password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.config.reset_password_length)
            .map(char::from)
            .collect();

        person.password_hash = self.hash_password(&new_password)?;
        self.people.update(&person).await?;

        tracing::info!(person_id = %person.id, "password reset");
        Ok((person, new_password))
    }

    /// Own roles plus the roles of the person's group
    pub async fn effective_roles(&self, person: &Person) -> Result<BTreeSet<String>> {
        let mut roles = person.roles.clone();
        if let Some(group_id) = person.group_id {
            // A dangling group reference grants nothing
            if let Some(group) = self.groups.find_by_id(group_id).await? {
                roles.extend(group.roles);
            }
        }
        Ok(roles)
    }

    pub async fn has_roles(&self, person: &Person, expression: Option<&str>) -> Result<bool> {
        let Some(source) = expression.filter(|source| !source.trim().is_empty()) else {
            return Ok(true);
        };
        let parsed = RoleExpression::parse(source)?;
        let roles = self.effective_roles(person).await?;
        Ok(parsed.evaluate(&roles))
    }

    /// Grant existing roles by name and persist the person
    pub async fn add_roles(&self, person: &mut Person, names: &[&str]) -> Result<()> {
        for name in names {
            if self.roles.find_by_name(name).await?.is_none() {
                return Err(IdentityError::UnknownRole((*name).to_string()));
            }
        }
        person.roles.extend(names.iter().map(|name| (*name).to_string()));
        self.people.update(person).await?;
        Ok(())
    }

    pub async fn can_be_destroyed(&self, person: &Person) -> Result<bool> {
        Ok(!self.has_roles(person, Some(ACCOUNT_ADMIN_ROLE)).await?)
    }

    /// Where a freshly signed-in person should land
    pub async fn post_login_destination(
        &self,
        account: &Account,
        person: &Person,
        catalog: &SubscriptionCatalog,
        paths: &PathSettings,
    ) -> Result<String> {
        if account.active {
            return Ok("/".to_string());
        }

        let destination = if self.has_roles(person, Some(ACCOUNT_ADMIN_ROLE)).await? {
            if account.requires_payment(catalog) {
                paths.change_payment_method.clone()
            } else {
                paths.reactivate_free_account.clone()
            }
        } else {
            paths.inactive_account.clone()
        };
        Ok(destination)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| IdentityError::HashingError)?
            .to_string();
        Ok(password_hash)
    }

    fn validate_password(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.config.password_min_length {
            return Err(IdentityError::WeakPassword);
        }
        Ok(())
    }
}
