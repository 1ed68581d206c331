use crate::regulator::ResourceUsage;
use async_trait::async_trait;
use auth_identity::repository::PersonRepository;
use auth_identity::Account;
use error_common::Result;
use std::sync::Arc;

/// Supplies usage counters for a tenant before the gate runs
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn usage(&self, account: &Account) -> Result<ResourceUsage>;
}

/// Counts the people of an account under one resource name
pub struct PersonCountUsage {
    people: Arc<dyn PersonRepository>,
    resource: String,
}

impl PersonCountUsage {
    pub fn new(people: Arc<dyn PersonRepository>, resource: impl Into<String>) -> Self {
        Self {
            people,
            resource: resource.into(),
        }
    }
}

#[async_trait]
impl UsageSource for PersonCountUsage {
    async fn usage(&self, account: &Account) -> Result<ResourceUsage> {
        let count = self.people.count_for_account(account.id).await?;
        Ok(ResourceUsage::new().with(self.resource.clone(), count))
    }
}

/// Merges the counters of several sources
#[derive(Default)]
pub struct CombinedUsage {
    sources: Vec<Arc<dyn UsageSource>>,
}

impl CombinedUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: Arc<dyn UsageSource>) -> Self {
        self.sources.push(source);
        self
    }
}

#[async_trait]
impl UsageSource for CombinedUsage {
    async fn usage(&self, account: &Account) -> Result<ResourceUsage> {
        let mut combined = ResourceUsage::new();
        for source in &self.sources {
            combined.merge(source.usage(account).await?);
        }
        Ok(combined)
    }
}
