use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub password_min_length: usize,
    /// Length of generated passwords handed out by a reset
    pub reset_password_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            password_min_length: 6,
            reset_password_length: 7,
        }
    }
}
