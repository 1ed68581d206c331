use crate::regulator::ResourceUsage;
use auth_identity::{Account, Person};
use http::Method;
use std::collections::BTreeSet;

/// Transport-level facts about the incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFacts {
    pub method: Method,
    pub secure: bool,
    pub host: String,
    /// Path plus query string
    pub full_path: String,
}

impl RequestFacts {
    pub fn new(method: Method, secure: bool, host: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            method,
            secure,
            host: host.into(),
            full_path: full_path.into(),
        }
    }

    /// Same location over https
    pub fn secure_url(&self) -> String {
        format!("https://{}{}", self.host, self.full_path)
    }
}

/// Tenant addressed by the request, with its usage counters
#[derive(Debug, Clone)]
pub struct ResolvedTenant {
    pub account: Account,
    pub usage: ResourceUsage,
}

/// Signed-in person with the effective role set already expanded
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub person: Person,
    pub roles: BTreeSet<String>,
}
