use chrono::{DateTime, NaiveDate, Utc};
use logger_redacted::mask_card_number;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card expiry as printed on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardExpiry {
    pub year: i32,
    pub month: u32,
}

impl CardExpiry {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// `YYYY-MM`, the form the gateway expects
    pub fn to_gateway_format(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Raw card data; lives only for the duration of a gateway call
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CardDetails {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    pub expires: CardExpiry,
}

impl CardDetails {
    pub fn holder_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn masked_number(&self) -> String {
        mask_card_number(&self.number)
    }

    /// Reject input the gateway would bounce anyway
    pub fn validate(&self) -> std::result::Result<(), String> {
        let digits = self.number.chars().filter(char::is_ascii_digit).count();
        if !(13..=19).contains(&digits) {
            return Err("card number must have 13 to 19 digits".to_string());
        }
        if !(1..=12).contains(&self.expires.month) {
            return Err("card expiry month must be between 1 and 12".to_string());
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("card holder name is required".to_string());
        }
        Ok(())
    }
}

// Never print the raw number
impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("holder", &self.holder_name())
            .field("number", &self.masked_number())
            .field("expires", &self.expires)
            .finish()
    }
}

/// Everything the gateway needs to open a recurring subscription
#[derive(Debug, Clone)]
pub struct StartSubscription {
    /// Our reference for the tenant, echoed back by the gateway as `refId`
    pub reference: String,
    pub amount: Decimal,
    pub card: CardDetails,
    /// Billing interval in months
    pub period: u32,
    pub trial_periods: u32,
    /// First billing date; tomorrow when unset
    pub start_date: Option<NaiveDate>,
}

/// Local ledger entry for a tenant's recurring subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Card holder name
    pub name: String,
    /// Masked card number
    pub number: String,
    pub amount: Decimal,
    /// Billing interval in months
    pub period: u32,
    /// Tenant reference sent to the gateway
    pub token: String,
    /// Subscription id issued by the gateway
    pub gateway_token: String,
    /// Anchor date of the billing schedule
    pub active_on: NaiveDate,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_on: NaiveDate,
}

/// Where a payment is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Active,
    CancelledPendingExpiry,
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardDetails {
        CardDetails {
            first_name: "Test".to_string(),
            last_name: "Testerson".to_string(),
            number: "4111111111111111".to_string(),
            expires: CardExpiry::new(2030, 8),
        }
    }

    #[test]
    fn test_card_masking_and_holder() {
        let card = card();
        assert_eq!(card.masked_number(), "************1111");
        assert_eq!(card.holder_name(), "Test Testerson");
        assert_eq!(card.expires.to_gateway_format(), "2030-08");
    }

    #[test]
    fn test_debug_hides_number() {
        let printed = format!("{:?}", card());
        assert!(!printed.contains("4111111111111111"));
        assert!(printed.contains("************1111"));
    }

    #[test]
    fn test_card_validation() {
        assert!(card().validate().is_ok());

        let mut short = card();
        short.number = "4111".to_string();
        assert!(short.validate().is_err());

        let mut bad_month = card();
        bad_month.expires.month = 13;
        assert!(bad_month.validate().is_err());
    }
}
