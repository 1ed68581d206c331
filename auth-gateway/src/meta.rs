use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Access requirements declared by a route
///
/// Every field is optional; an empty record still requires a resolved tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    #[serde(default, alias = "ssl")]
    pub require_ssl: bool,
    #[serde(default = "default_true")]
    pub requires_account: bool,
    #[serde(default)]
    pub inactive_account_ok: bool,
    #[serde(default)]
    pub requires_login: bool,
    #[serde(default)]
    pub requires_logout: bool,
    #[serde(default)]
    pub requires_resource: Option<String>,
    #[serde(default)]
    pub roles: Option<String>,
}

impl Default for RouteMeta {
    fn default() -> Self {
        Self {
            require_ssl: false,
            requires_account: true,
            inactive_account_ok: false,
            requires_login: false,
            requires_logout: false,
            requires_resource: None,
            roles: None,
        }
    }
}

impl RouteMeta {
    /// Route reachable only from a bare domain, e.g. account signup
    pub fn signup() -> Self {
        Self {
            requires_account: false,
            ..Self::default()
        }
    }

    pub fn ssl(mut self) -> Self {
        self.require_ssl = true;
        self
    }

    pub fn login(mut self) -> Self {
        self.requires_login = true;
        self
    }

    pub fn logout_only(mut self) -> Self {
        self.requires_logout = true;
        self
    }

    pub fn inactive_ok(mut self) -> Self {
        self.inactive_account_ok = true;
        self
    }

    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.requires_resource = Some(name.into());
        self
    }

    pub fn roles(mut self, expression: impl Into<String>) -> Self {
        self.roles = Some(expression.into());
        self
    }

    /// Declaring `roles` implies a signed-in person
    pub fn needs_login(&self) -> bool {
        self.requires_login || self.roles.is_some()
    }
}
