use crate::facts::ResolvedTenant;
use config_engine::{ResourceLimit, SubscriptionCatalog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Usage counters captured when the tenant was resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage(BTreeMap<String, u64>);

impl ResourceUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Into<String>, used: u64) -> Self {
        self.0.insert(resource.into(), used);
        self
    }

    /// Take every counter from `other`, replacing duplicates
    pub fn merge(&mut self, other: ResourceUsage) {
        self.0.extend(other.0);
    }

    /// Recorded usage, zero when never recorded
    pub fn get(&self, resource: &str) -> u64 {
        self.0.get(resource).copied().unwrap_or(0)
    }
}

/// Read-only check of one resource against the tier's limit
pub type Regulator = Arc<dyn Fn(&ResolvedTenant, ResourceLimit) -> bool + Send + Sync>;

/// Admit while recorded usage of `resource` stays below the limit
pub fn below_usage(resource: impl Into<String>) -> Regulator {
    let resource = resource.into();
    Arc::new(move |tenant: &ResolvedTenant, limit: ResourceLimit| limit.admits(tenant.usage.get(&resource)))
}

/// Admit when the tier switches the feature on
pub fn flag_enabled() -> Regulator {
    Arc::new(|_: &ResolvedTenant, limit: ResourceLimit| limit.is_enabled())
}

/// Registry of resource name to regulator
#[derive(Clone, Default)]
pub struct ResourceRegulator {
    regulators: HashMap<String, Regulator>,
}

impl ResourceRegulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, resource: impl Into<String>, regulator: Regulator) -> Self {
        self.regulators.insert(resource.into(), regulator);
        self
    }

    pub fn is_registered(&self, resource: &str) -> bool {
        self.regulators.contains_key(resource)
    }

    /// Decide whether the tenant's tier still grants `resource`
    pub fn permits(
        &self,
        resource: Option<&str>,
        tenant: &ResolvedTenant,
        catalog: &SubscriptionCatalog,
    ) -> bool {
        let Some(resource) = resource else {
            return true;
        };
        let Some(regulator) = self.regulators.get(resource) else {
            return true;
        };

        let Some(limit) = tenant
            .account
            .subscription_level(catalog)
            .and_then(|level| level.resource(resource))
        else {
            tracing::warn!(
                account_id = %tenant.account.id,
                level = tenant.account.subscription_level_id,
                resource = resource,
                "subscription level does not configure regulated resource"
            );
            return false;
        };

        match limit {
            ResourceLimit::Unlimited => true,
            limit => regulator(tenant, limit),
        }
    }
}

impl fmt::Debug for ResourceRegulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.regulators.keys().collect();
        names.sort();
        f.debug_struct("ResourceRegulator")
            .field("resources", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_identity::Account;
    use config_engine::SubscriptionLevel;
    use rust_decimal::Decimal;

    fn catalog() -> SubscriptionCatalog {
        let resources = [
            ("people".to_string(), ResourceLimit::Limited(10)),
            ("chat".to_string(), ResourceLimit::Flag(false)),
            ("projects".to_string(), ResourceLimit::Unlimited),
        ];
        SubscriptionCatalog::new(vec![SubscriptionLevel {
            handle: "free".to_string(),
            name: "Free".to_string(),
            description: String::new(),
            price: Decimal::ZERO,
            period: 1,
            trial_periods: 0,
            resources: resources.into(),
        }])
    }

    fn tenant(people: u64, projects: u64) -> ResolvedTenant {
        ResolvedTenant {
            account: Account::new("acme", "example.com", "Acme", 0),
            usage: ResourceUsage::new()
                .with("people", people)
                .with("projects", projects),
        }
    }

    fn regulator() -> ResourceRegulator {
        ResourceRegulator::new()
            .register("people", below_usage("people"))
            .register("projects", below_usage("projects"))
            .register("chat", flag_enabled())
            .register("disk", below_usage("disk"))
    }

    #[test]
    fn test_unset_or_unregistered_resource_is_permitted() {
        let catalog = catalog();
        assert!(regulator().permits(None, &tenant(99, 0), &catalog));
        assert!(regulator().permits(Some("widgets"), &tenant(99, 0), &catalog));
    }

    #[test]
    fn test_limit_boundary() {
        let catalog = catalog();
        assert!(regulator().permits(Some("people"), &tenant(9, 0), &catalog));
        assert!(!regulator().permits(Some("people"), &tenant(10, 0), &catalog));
    }

    #[test]
    fn test_unlimited_and_flags() {
        let catalog = catalog();
        assert!(regulator().permits(Some("projects"), &tenant(0, 65535), &catalog));
        assert!(!regulator().permits(Some("chat"), &tenant(0, 0), &catalog));
    }

    #[test]
    fn test_regulated_resource_missing_from_tier_is_denied() {
        assert!(!regulator().permits(Some("disk"), &tenant(0, 0), &catalog()));
    }
}
