use chrono::{DateTime, Utc};
use config_engine::{SubscriptionCatalog, SubscriptionLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Role every account creator receives
pub const ACCOUNT_ADMIN_ROLE: &str = "account_admin";

/// A tenant, addressed by `subdomain.domain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub subdomain: String,
    pub domain: String,
    pub name: String,
    pub timezone: String,
    pub website: Option<String>,
    pub active: bool,
    /// Position in the subscription catalogue
    pub subscription_level_id: usize,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        subdomain: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
        subscription_level_id: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subdomain: subdomain.into().to_lowercase(),
            domain: domain.into().to_lowercase(),
            name: name.into(),
            timezone: "UTC".to_string(),
            website: None,
            active: true,
            subscription_level_id,
            created_at: Utc::now(),
        }
    }

    pub fn full_domain(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    pub fn subscription_level<'c>(&self, catalog: &'c SubscriptionCatalog) -> Option<&'c SubscriptionLevel> {
        catalog.get(self.subscription_level_id)
    }

    /// True when the current tier carries a price
    pub fn requires_payment(&self, catalog: &SubscriptionCatalog) -> bool {
        self.subscription_level(catalog)
            .is_some_and(|level| !level.is_free())
    }
}

/// Stored role label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Named set of roles shared by several people of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub roles: BTreeSet<String>,
}

impl Group {
    pub fn new(account_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }
}

/// An identity inside exactly one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string; empty until a password is set
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub group_id: Option<Uuid>,
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn new(account_id: Uuid, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            password_hash: String::new(),
            group_id: None,
            roles: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_account_admin(&self) -> bool {
        self.roles.contains(ACCOUNT_ADMIN_ROLE)
    }
}

/// Input for creating a person; the password is hashed on the way in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn catalog() -> SubscriptionCatalog {
        let level = |handle: &str, price: i64| SubscriptionLevel {
            handle: handle.to_string(),
            name: handle.to_string(),
            description: String::new(),
            price: Decimal::new(price, 2),
            period: 1,
            trial_periods: 0,
            resources: Default::default(),
        };
        SubscriptionCatalog::new(vec![level("free", 0), level("silver", 10000)])
    }

    #[test]
    fn test_account_domain_and_payment() {
        let mut account = Account::new("Acme", "Example.com", "Acme Inc", 0);
        assert_eq!(account.full_domain(), "acme.example.com");
        assert!(!account.requires_payment(&catalog()));

        account.subscription_level_id = 1;
        assert!(account.requires_payment(&catalog()));

        account.subscription_level_id = 7;
        assert!(!account.requires_payment(&catalog()));
    }

    #[test]
    fn test_person_admin_flag() {
        let mut person = Person::new(Uuid::new_v4(), "bob", "bob@example.com");
        assert!(!person.is_account_admin());
        person.roles.insert(ACCOUNT_ADMIN_ROLE.to_string());
        assert!(person.is_account_admin());
    }
}
