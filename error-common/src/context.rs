use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Error context information
///
/// Entries are kept ordered so rendered alerts are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub account_id: Option<Uuid>,
    pub request_id: Option<String>,
    pub additional: BTreeMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.additional.get(key).map(String::as_str)
    }

    /// Flatten into string pairs, identifiers first
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.additional.len() + 2);
        if let Some(account_id) = self.account_id {
            pairs.push(("account_id".to_string(), account_id.to_string()));
        }
        if let Some(ref request_id) = self.request_id {
            pairs.push(("request_id".to_string(), request_id.clone()));
        }
        pairs.extend(self.additional.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}
