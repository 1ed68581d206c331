use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[allow(clippy::expect_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("email pattern");
        pub static ref CARD_NUMBER_REGEX: Regex =
            Regex::new(r"\b(?:\d[ -]?){12,18}\d\b").expect("card number pattern");
        pub static ref GATEWAY_SECRET_REGEX: Regex = Regex::new(
            r"<(transactionKey|cardNumber|cardCode)>([^<]*)</(?:transactionKey|cardNumber|cardCode)>"
        )
        .expect("gateway secret pattern");
    }
}

use patterns::{CARD_NUMBER_REGEX, EMAIL_REGEX, GATEWAY_SECRET_REGEX};

/// Which kinds of sensitive text are rewritten
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub enabled: bool,
    pub redact_emails: bool,
    pub redact_card_numbers: bool,
    /// Values of `<transactionKey>`, `<cardNumber>` and `<cardCode>` elements
    pub redact_gateway_secrets: bool,
    /// Replace emails by a stable short hash instead of a mask
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_emails: true,
            redact_card_numbers: true,
            redact_gateway_secrets: true,
            hash_for_correlation: false,
        }
    }
}

/// Rewrites log payloads before they reach the subscriber
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        let mut result = text.to_string();

        // Element values first so the card pass never sees a raw key
        if self.config.redact_gateway_secrets {
            result = self.redact_gateway_secrets(&result);
        }

        if self.config.redact_card_numbers {
            result = CARD_NUMBER_REGEX
                .replace_all(&result, |caps: &regex::Captures| mask_card_number(&caps[0]))
                .to_string();
        }

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        result
    }

    fn redact_gateway_secrets(&self, text: &str) -> String {
        GATEWAY_SECRET_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let element = &caps[1];
                let value = if element == "cardNumber" {
                    mask_card_number(&caps[2])
                } else {
                    "[REDACTED]".to_string()
                };
                format!("<{element}>{value}</{element}>")
            })
            .to_string()
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = &caps[0];
                if self.config.hash_for_correlation {
                    return format!("EMAIL[{}]", self.hash_value(email));
                }
                match email.split_once('@') {
                    Some((local, domain)) => format!(
                        "{}***@{}***",
                        local.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            })
            .to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        // First 8 bytes are plenty for correlating log lines
        general_purpose::STANDARD.encode(result.get(..8).unwrap_or_default())
    }
}

/// Mask every digit except the last four, dropping separators
///
/// ```rust
/// assert_eq!(logger_redacted::mask_card_number("4111 1111 1111 1234"), "************1234");
/// ```
pub fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let visible = digits.len().saturating_sub(4);
    digits
        .iter()
        .enumerate()
        .map(|(index, digit)| if index < visible { '*' } else { *digit })
        .collect()
}
