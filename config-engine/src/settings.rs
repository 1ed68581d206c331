use crate::error::{ConfigError, Result};
use crate::subscription::SubscriptionCatalog;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `SAAS_GATEWAY__LOGIN`
pub const ENV_PREFIX: &str = "SAAS_";

/// Redirect targets used by the gate and the login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub login: String,
    pub inactive_account: String,
    pub upgrade: String,
    pub change_payment_method: String,
    pub reactivate_free_account: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            login: "/account/signin/".to_string(),
            inactive_account: "/account/inactive/".to_string(),
            upgrade: "/account/upgrade/".to_string(),
            change_payment_method: "/account/change_payment_method/".to_string(),
            reactivate_free_account: "/account/reactivate_free_account/".to_string(),
        }
    }
}

/// Recurring billing gateway connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub url: String,
    pub login: String,
    pub transaction_key: String,
    /// Whole-call deadline; expiry counts as an ambiguous outcome
    pub timeout_secs: u64,
    /// Billing occurrences scheduled when a subscription starts
    pub total_occurrences: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: "https://apitest.authorize.net/xml/v1/request.api".to_string(),
            login: String::new(),
            transaction_key: String::new(),
            timeout_secs: 30,
            total_occurrences: 36,
        }
    }
}

/// Outbound mail settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub from_address: String,
    /// Recipients of operator alerts
    pub operators: Vec<String>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from_address: "noreply@localhost".to_string(),
            operators: Vec::new(),
        }
    }
}

/// Complete platform configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Domains tenants may sign up under
    pub domains: Vec<String>,
    pub paths: PathSettings,
    pub gateway: GatewaySettings,
    pub mail: MailSettings,
    pub subscription_levels: SubscriptionCatalog,
}

impl PlatformConfig {
    /// Layer defaults, an optional YAML file and `SAAS_` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(&figment)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;

        tracing::info!(
            domains = config.domains.len(),
            levels = config.subscription_levels.len(),
            gateway = %config.gateway.url,
            "platform configuration loaded"
        );
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first defect.
    pub fn validate(&self) -> Result<()> {
        self.subscription_levels.validate()?;

        if self.domains.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one tenant domain is required".to_string(),
            ));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gateway timeout must be positive".to_string(),
            ));
        }

        let needs_gateway = self.subscription_levels.levels().iter().any(|level| !level.is_free());
        if needs_gateway && self.gateway.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "priced subscription levels need a gateway url".to_string(),
            ));
        }
        if self.mail.operators.is_empty() {
            tracing::warn!("no operators configured; gateway alerts will have no recipient");
        }

        Ok(())
    }

    pub fn is_allowed_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|allowed| allowed.eq_ignore_ascii_case(domain))
    }
}
