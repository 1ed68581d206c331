use crate::error::{BillingError, Result};
use crate::gateway::PaymentGateway;
use crate::models::{CardDetails, RecurringPayment, StartSubscription};
use crate::repository::PaymentRepository;
use chrono::{DateTime, Days, NaiveDate, Utc};
use config_engine::SubscriptionLevel;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Recurring payment operations against one gateway and one ledger
pub struct BillingService {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
}

impl BillingService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { gateway, payments }
    }

    pub fn payments(&self) -> &Arc<dyn PaymentRepository> {
        &self.payments
    }

    /// Current payment of the account, if any
    pub async fn current(&self, account_id: Uuid) -> Result<Option<RecurringPayment>> {
        Ok(self.payments.find_for_account(account_id).await?)
    }

    /// Open a subscription for `level` and build the unsaved ledger entry
    ///
    /// The entry's anchor is the first billing date sent to the gateway.
    ///
    /// # Errors
    ///
    /// [`BillingError::Validation`] for unusable card data or a free level,
    /// otherwise the gateway failure.
    pub async fn open(
        &self,
        account_id: Uuid,
        level: &SubscriptionLevel,
        card: &CardDetails,
        start_date: Option<NaiveDate>,
    ) -> Result<RecurringPayment> {
        card.validate().map_err(BillingError::Validation)?;
        if level.is_free() {
            return Err(BillingError::Validation(format!(
                "subscription level {} has no price",
                level.handle
            )));
        }

        let today = Utc::now().date_naive();
        let start_date =
            start_date.unwrap_or_else(|| today.checked_add_days(Days::new(1)).unwrap_or(today));

        let request = StartSubscription {
            reference: account_id.to_string(),
            amount: level.price,
            card: card.clone(),
            period: level.period,
            trial_periods: level.trial_periods,
            start_date: Some(start_date),
        };
        let gateway_token = self.gateway.start(&request).await?;

        Ok(RecurringPayment {
            id: Uuid::new_v4(),
            account_id,
            name: card.holder_name(),
            number: card.masked_number(),
            amount: level.price,
            period: level.period,
            token: request.reference,
            gateway_token,
            active_on: start_date,
            cancelled_at: None,
            created_on: today,
        })
    }

    pub async fn save(&self, payment: &RecurringPayment) -> Result<()> {
        self.payments.insert(payment).await?;
        tracing::info!(
            account_id = %payment.account_id,
            payment_id = %payment.id,
            gateway_token = %payment.gateway_token,
            "recurring payment recorded"
        );
        Ok(())
    }

    pub async fn delete(&self, payment: &RecurringPayment) -> Result<()> {
        self.payments.delete(payment.id).await?;
        tracing::info!(
            account_id = %payment.account_id,
            payment_id = %payment.id,
            "recurring payment removed"
        );
        Ok(())
    }

    /// Change the billed amount remotely, then locally
    pub async fn change_amount(&self, payment: &mut RecurringPayment, amount: Decimal) -> Result<()> {
        self.gateway.change(&payment.gateway_token, amount).await?;
        payment.amount = amount;
        self.payments.update(payment).await?;
        Ok(())
    }

    /// Cancel remotely, then mark the local entry cancelled as of `at`
    pub async fn cancel(&self, payment: &mut RecurringPayment, at: DateTime<Utc>) -> Result<()> {
        self.gateway.cancel(&payment.gateway_token).await?;
        payment.deactivate(at);
        self.payments.update(payment).await?;
        Ok(())
    }

    /// Cancel a subscription that has no local entry
    pub async fn cancel_remote(&self, gateway_token: &str) -> Result<()> {
        Ok(self.gateway.cancel(gateway_token).await?)
    }
}
