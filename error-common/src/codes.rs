// Error codes implementation
// Stable identifiers surfaced in user feedback, logs and operator alerts

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const DUPLICATE_VALUE: &str = "VALIDATION_1003";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
    pub const TIER_CHANGE_REJECTED: &str = "AUTHZ_3002";
}

pub mod persistence {
    pub const NOT_FOUND: &str = "STORE_4001";
    pub const CONFLICT: &str = "STORE_4002";
    pub const FAILURE: &str = "STORE_4003";
}

pub mod gateway {
    pub const REQUEST_REJECTED: &str = "GATEWAY_5001";
    pub const RESPONSE_INVALID: &str = "GATEWAY_5002";
    pub const CANCEL_FAILED: &str = "GATEWAY_5003";
}

pub mod configuration {
    pub const INVALID: &str = "CONFIG_6001";
    pub const ROLE_EXPRESSION: &str = "CONFIG_6002";
}

pub mod internal {
    pub const UNEXPECTED: &str = "INTERNAL_9001";
}
