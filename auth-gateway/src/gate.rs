use crate::error::Result;
use crate::facts::{RequestFacts, ResolvedIdentity, ResolvedTenant};
use crate::meta::RouteMeta;
use crate::regulator::ResourceRegulator;
use auth_roles::RoleExpression;
use config_engine::{PathSettings, SubscriptionCatalog};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Outcome of gating one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Redirect {
        location: String,
        permanent: bool,
        secure: bool,
    },
    NotFound,
    Forbidden,
}

impl GateDecision {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
            permanent: false,
            secure: false,
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Redirect { location, .. } => write!(f, "redirect:{location}"),
            Self::NotFound => f.write_str("not_found"),
            Self::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// Per-request authorization decision over already-resolved facts
#[derive(Debug, Clone)]
pub struct Gate {
    catalog: Arc<SubscriptionCatalog>,
    regulator: ResourceRegulator,
    paths: PathSettings,
}

impl Gate {
    pub fn new(catalog: Arc<SubscriptionCatalog>, regulator: ResourceRegulator, paths: PathSettings) -> Self {
        Self {
            catalog,
            regulator,
            paths,
        }
    }

    pub fn paths(&self) -> &PathSettings {
        &self.paths
    }

    /// Walk the route's requirements in order; the first terminal outcome wins
    ///
    /// # Errors
    ///
    /// Returns [`crate::GateError::RoleExpression`] when the route's `roles`
    /// expression is malformed.
    pub fn evaluate(
        &self,
        meta: &RouteMeta,
        request: &RequestFacts,
        tenant: Option<&ResolvedTenant>,
        identity: Option<&ResolvedIdentity>,
    ) -> Result<GateDecision> {
        let decision = self.decide(meta, request, tenant, identity)?;
        tracing::debug!(
            method = %request.method,
            path = %request.full_path,
            account_id = ?tenant.map(|t| t.account.id),
            person_id = ?identity.map(|i| i.person.id),
            decision = %decision,
            "gate decision"
        );
        Ok(decision)
    }

    fn decide(
        &self,
        meta: &RouteMeta,
        request: &RequestFacts,
        tenant: Option<&ResolvedTenant>,
        identity: Option<&ResolvedIdentity>,
    ) -> Result<GateDecision> {
        if meta.require_ssl && !request.secure {
            // A write cannot be replayed across a redirect
            if request.method.is_safe() {
                return Ok(GateDecision::Redirect {
                    location: request.secure_url(),
                    permanent: true,
                    secure: true,
                });
            }
            return Ok(GateDecision::Forbidden);
        }

        let tenant = match (meta.requires_account, tenant) {
            (true, None) | (false, Some(_)) => return Ok(GateDecision::NotFound),
            (false, None) => return Ok(GateDecision::Allow),
            (true, Some(tenant)) => tenant,
        };

        if !tenant.account.active && !meta.inactive_account_ok {
            return Ok(GateDecision::redirect(&self.paths.inactive_account));
        }

        if meta.requires_logout && identity.is_some() {
            return Ok(GateDecision::Forbidden);
        }
        if meta.needs_login() && identity.is_none() {
            return Ok(GateDecision::redirect(&self.paths.login));
        }

        if !self
            .regulator
            .permits(meta.requires_resource.as_deref(), tenant, &self.catalog)
        {
            return Ok(GateDecision::redirect(&self.paths.upgrade));
        }

        let Some(identity) = identity else {
            return Ok(GateDecision::Allow);
        };

        let allowed = match meta.roles.as_deref() {
            None => true,
            Some(source) => RoleExpression::parse(source)?.evaluate(&identity.roles),
        };
        Ok(if allowed {
            GateDecision::Allow
        } else {
            GateDecision::Forbidden
        })
    }
}
