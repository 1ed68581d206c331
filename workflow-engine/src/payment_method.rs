use crate::error::Result;
use crate::outcome::{Feedback, Outcome};
use crate::workflow::{store_error, SubscriptionWorkflow};
use billing_service::{BillingError, CardDetails, GatewayError, RecurringPayment};
use chrono::Utc;
use uuid::Uuid;

impl SubscriptionWorkflow {
    /// Replace the card behind a tenant's subscription
    ///
    /// The new subscription starts on the old one's next billing date.
    /// Order: start remotely, store the new record, delete the old record,
    /// cancel the old subscription. A failed start leaves everything as it
    /// was. A new record that cannot be stored is cancelled remotely again.
    /// When the old subscription may still be billing the new record is
    /// kept and [`Outcome::CancelFailed`] is reported.
    pub async fn change_payment_method(
        &self,
        account_id: Uuid,
        card: &CardDetails,
    ) -> Result<Outcome<RecurringPayment>> {
        let _guard = self.locks.acquire(account_id).await;

        let Some(mut account) = self.load_account(account_id).await? else {
            return Ok(Outcome::NotFound);
        };
        let Some(level) = account.subscription_level(&self.config.subscription_levels).cloned() else {
            return Ok(Outcome::NotFound);
        };
        if level.is_free() {
            return Ok(Outcome::Forbidden);
        }

        let now = Utc::now();
        let old = self.billing.current(account.id).await.map_err(store_error)?;
        let start_date = old.as_ref().map(|old| old.next_payment(now).date_naive());

        let new = match self.billing.open(account.id, &level, card, start_date).await {
            Ok(payment) => payment,
            Err(err) => return self.billing_failure(err, &account.name, Some(account.id)).await,
        };

        if !self.store_started(&account, &new).await {
            return Ok(Outcome::ProcessingError);
        }
        self.reactivate(&mut account).await;

        let Some(old) = old else {
            tracing::info!(account_id = %account.id, gateway_token = %new.gateway_token, "payment method added");
            return Ok(Outcome::Done(new));
        };
        if let Some(old_gateway_token) = self.retire_payment(&account, &old, &new).await {
            return Ok(Outcome::CancelFailed { old_gateway_token });
        }

        tracing::info!(
            account_id = %account.id,
            old_gateway_token = %old.gateway_token,
            new_gateway_token = %new.gateway_token,
            "payment method replaced"
        );
        Ok(Outcome::Done(new))
    }

    /// Stop billing a tenant
    ///
    /// With a payment the subscription is cancelled and the account stays
    /// usable until the paid period ends. Without one the account is
    /// deactivated at once.
    pub async fn cancel_payment_method(&self, account_id: Uuid) -> Result<Outcome<RecurringPayment>> {
        let _guard = self.locks.acquire(account_id).await;

        let Some(mut account) = self.load_account(account_id).await? else {
            return Ok(Outcome::NotFound);
        };

        let Some(mut payment) = self.billing.current(account.id).await.map_err(store_error)? else {
            account.active = false;
            self.accounts.update(&account).await?;
            tracing::info!(account_id = %account.id, "free account deactivated");
            return Ok(Outcome::Redirect(self.config.paths.reactivate_free_account.clone()));
        };

        if !payment.is_active() {
            return Ok(Outcome::Done(payment));
        }

        match self.billing.cancel(&mut payment, Utc::now()).await {
            Ok(()) => {
                tracing::info!(
                    account_id = %account.id,
                    gateway_token = %payment.gateway_token,
                    "payment cancelled"
                );
                Ok(Outcome::Done(payment))
            }
            Err(BillingError::Gateway(GatewayError::Request { messages })) => {
                Ok(Outcome::Invalid(Feedback::from_gateway(messages)))
            }
            Err(BillingError::Gateway(err)) => {
                self.alert_cancel_error(&account, &payment.gateway_token, None, &err.to_string())
                    .await;
                Ok(Outcome::ProcessingError)
            }
            Err(err) => Err(store_error(err)),
        }
    }
}
