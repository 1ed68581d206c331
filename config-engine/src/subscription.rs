use crate::error::{ConfigError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Configured allowance for one named resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLimit", into = "RawLimit")]
pub enum ResourceLimit {
    /// Usage must stay strictly below this value
    Limited(u64),
    /// Feature switch such as `chat` or `ssl`
    Flag(bool),
    /// No restriction at all
    Unlimited,
}

impl ResourceLimit {
    pub const UNLIMITED_MARKER: &'static str = "unlimited";

    /// True when `usage` is still inside the allowance
    pub fn admits(&self, usage: u64) -> bool {
        match self {
            Self::Limited(limit) => usage < *limit,
            Self::Flag(enabled) => *enabled,
            Self::Unlimited => true,
        }
    }

    /// True when the feature is switched on at all
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Limited(limit) => *limit > 0,
            Self::Flag(enabled) => *enabled,
            Self::Unlimited => true,
        }
    }
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(limit) => write!(f, "{limit}"),
            Self::Flag(enabled) => write!(f, "{enabled}"),
            Self::Unlimited => f.write_str(Self::UNLIMITED_MARKER),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Number(u64),
    Switch(bool),
    Marker(String),
}

impl TryFrom<RawLimit> for ResourceLimit {
    type Error = ConfigError;

    fn try_from(raw: RawLimit) -> Result<Self> {
        match raw {
            RawLimit::Number(limit) => Ok(Self::Limited(limit)),
            RawLimit::Switch(enabled) => Ok(Self::Flag(enabled)),
            RawLimit::Marker(marker) if marker.eq_ignore_ascii_case(Self::UNLIMITED_MARKER) => {
                Ok(Self::Unlimited)
            }
            RawLimit::Marker(other) => Err(ConfigError::InvalidResourceLimit(other)),
        }
    }
}

impl From<ResourceLimit> for RawLimit {
    fn from(limit: ResourceLimit) -> Self {
        match limit {
            ResourceLimit::Limited(limit) => Self::Number(limit),
            ResourceLimit::Flag(enabled) => Self::Switch(enabled),
            ResourceLimit::Unlimited => Self::Marker(ResourceLimit::UNLIMITED_MARKER.to_string()),
        }
    }
}

fn default_period() -> u32 {
    1
}

/// One subscription tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionLevel {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price per billing period; zero means the tier is free
    pub price: Decimal,
    /// Billing period in months
    #[serde(default = "default_period")]
    pub period: u32,
    /// Number of trial periods granted on signup
    #[serde(default)]
    pub trial_periods: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceLimit>,
}

impl SubscriptionLevel {
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    pub fn resource(&self, name: &str) -> Option<ResourceLimit> {
        self.resources.get(name).copied()
    }
}

/// Ordered list of tiers, addressed by position
///
/// An account stores the index of its tier, so the configured order is
/// significant: later levels rank above earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionCatalog {
    levels: Vec<SubscriptionLevel>,
}

impl SubscriptionCatalog {
    pub fn new(levels: Vec<SubscriptionLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[SubscriptionLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, level_id: usize) -> Option<&SubscriptionLevel> {
        self.levels.get(level_id)
    }

    /// Find a level and its index by handle
    pub fn find(&self, handle: &str) -> Option<(usize, &SubscriptionLevel)> {
        self.levels
            .iter()
            .enumerate()
            .find(|(_, level)| level.handle == handle)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLevel`] when no level carries `handle`.
    pub fn index_of(&self, handle: &str) -> Result<usize> {
        self.find(handle)
            .map(|(index, _)| index)
            .ok_or_else(|| ConfigError::UnknownLevel(handle.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLevel`] when no level carries `handle`.
    pub fn has_level(&self, level_id: usize, handle: &str) -> Result<bool> {
        Ok(self.index_of(handle)? == level_id)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLevel`] when no level carries `handle`.
    pub fn has_level_or_greater(&self, level_id: usize, handle: &str) -> Result<bool> {
        Ok(level_id >= self.index_of(handle)?)
    }

    /// Check the catalogue is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first defect found.
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one subscription level is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for level in &self.levels {
            if level.handle.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "subscription level handle must not be empty".to_string(),
                ));
            }
            if !seen.insert(level.handle.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate subscription level handle '{}'",
                    level.handle
                )));
            }
            if level.price.is_sign_negative() {
                return Err(ConfigError::ValidationError(format!(
                    "subscription level '{}' has a negative price",
                    level.handle
                )));
            }
            if level.period == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "subscription level '{}' must bill at least every month",
                    level.handle
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(handle: &str, price: i64) -> SubscriptionLevel {
        SubscriptionLevel {
            handle: handle.to_string(),
            name: handle.to_string(),
            description: String::new(),
            price: Decimal::new(price, 2),
            period: 1,
            trial_periods: 0,
            resources: BTreeMap::new(),
        }
    }

    #[test]
    fn test_resource_limit_parsing() {
        let yaml = "people: 10\nchat: true\nprojects: unlimited\n";
        let parsed: BTreeMap<String, ResourceLimit> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(parsed.get("people").copied(), Some(ResourceLimit::Limited(10)));
        assert_eq!(parsed.get("chat").copied(), Some(ResourceLimit::Flag(true)));
        assert_eq!(parsed.get("projects").copied(), Some(ResourceLimit::Unlimited));

        assert!(serde_yaml::from_str::<ResourceLimit>("lots").is_err());
    }

    #[test]
    fn test_resource_limit_admits() {
        assert!(ResourceLimit::Limited(10).admits(9));
        assert!(!ResourceLimit::Limited(10).admits(10));
        assert!(ResourceLimit::Unlimited.admits(u64::MAX));
        assert!(!ResourceLimit::Flag(false).admits(0));
        assert!(!ResourceLimit::Limited(0).is_enabled());
    }

    #[test]
    fn test_level_ranking() {
        let catalog =
            SubscriptionCatalog::new(vec![level("free", 0), level("silver", 10000), level("gold", 20000)]);

        assert!(catalog.has_level(1, "silver").unwrap());
        assert!(!catalog.has_level(2, "silver").unwrap());
        assert!(catalog.has_level_or_greater(2, "silver").unwrap());
        assert!(!catalog.has_level_or_greater(0, "silver").unwrap());
        assert!(catalog.has_level(0, "platinum").is_err());
        assert!(catalog.get(0).unwrap().is_free());
    }

    #[test]
    fn test_validation_rejects_bad_catalogues() {
        assert!(SubscriptionCatalog::default().validate().is_err());

        let duplicate = SubscriptionCatalog::new(vec![level("free", 0), level("free", 100)]);
        assert!(duplicate.validate().is_err());

        let negative = SubscriptionCatalog::new(vec![level("free", -1)]);
        assert!(negative.validate().is_err());

        let mut no_period = level("silver", 100);
        no_period.period = 0;
        assert!(SubscriptionCatalog::new(vec![no_period]).validate().is_err());

        let fine = SubscriptionCatalog::new(vec![level("free", 0), level("silver", 100)]);
        assert!(fine.validate().is_ok());
    }
}
