use crate::error::Result;
use crate::locks::TenantLocks;
use crate::outcome::{Feedback, Outcome};
use auth_identity::repository::{AccountRepository, PersonRepository};
use auth_identity::{Account, IdentityService};
use billing_service::{BillingError, BillingService, GatewayError, RecurringPayment};
use config_engine::PlatformConfig;
use logger_redacted::PiiRedactor;
use email_service::{EmailService, PAYMENT_CANCEL_ERROR, PAYMENT_CREATE_ERROR};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
struct CreateErrorAlert<'a> {
    account_name: &'a str,
    account_id: String,
    error: String,
}

#[derive(Serialize)]
struct CancelErrorAlert<'a> {
    account_name: &'a str,
    account_id: String,
    old_gateway_token: &'a str,
    new_gateway_token: Option<&'a str>,
    error: String,
}

/// Orchestrates every flow that touches a tenant's subscription
///
/// The gateway is reached only through the injected [`BillingService`].
pub struct SubscriptionWorkflow {
    pub(crate) config: Arc<PlatformConfig>,
    pub(crate) accounts: Arc<dyn AccountRepository>,
    pub(crate) people: Arc<dyn PersonRepository>,
    pub(crate) identity: Arc<IdentityService>,
    pub(crate) billing: Arc<BillingService>,
    pub(crate) email: Arc<EmailService>,
    pub(crate) locks: TenantLocks,
    redactor: PiiRedactor,
}

impl SubscriptionWorkflow {
    pub fn new(
        config: Arc<PlatformConfig>,
        accounts: Arc<dyn AccountRepository>,
        people: Arc<dyn PersonRepository>,
        identity: Arc<IdentityService>,
        billing: Arc<BillingService>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            config,
            accounts,
            people,
            identity,
            billing,
            email,
            locks: TenantLocks::new(),
            redactor: PiiRedactor::default(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub(crate) async fn load_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.find_by_id(account_id).await?)
    }

    /// Record a subscription that was just started at the gateway
    ///
    /// When the record cannot be stored the remote subscription is
    /// cancelled again and the operators are told. Returns whether the
    /// payment is now on file.
    pub(crate) async fn store_started(&self, account: &Account, payment: &RecurringPayment) -> bool {
        let Err(err) = self.billing.save(payment).await else {
            return true;
        };
        tracing::error!(
            account_id = %account.id,
            gateway_token = %payment.gateway_token,
            error = %err,
            "started subscription not recorded, cancelling it"
        );

        let detail = match self.billing.cancel_remote(&payment.gateway_token).await {
            Ok(()) => format!("{err}; subscription {} was cancelled", payment.gateway_token),
            Err(cancel_err) => format!(
                "{err}; subscription {} could NOT be cancelled: {cancel_err}",
                payment.gateway_token
            ),
        };
        self.alert_create_error(&account.name, Some(account.id), &detail)
            .await;
        false
    }

    /// Drop the superseded record, then stop its remote subscription
    ///
    /// Returns the gateway token that may still be billing when either
    /// step failed for a payment that was still active. The operators have
    /// been alerted by then.
    pub(crate) async fn retire_payment(
        &self,
        account: &Account,
        old: &RecurringPayment,
        new: &RecurringPayment,
    ) -> Option<String> {
        if let Err(err) = self.billing.delete(old).await {
            if !old.is_active() {
                // Already cancelled remotely; the newer record is current
                tracing::warn!(
                    account_id = %account.id,
                    payment_id = %old.id,
                    error = %err,
                    "stale cancelled payment not removed"
                );
                return None;
            }
            tracing::error!(
                account_id = %account.id,
                old_gateway_token = %old.gateway_token,
                new_gateway_token = %new.gateway_token,
                error = %err,
                "superseded payment not removed, old subscription left running"
            );
            let detail = format!("{err}; old record kept, old subscription not cancelled");
            self.alert_cancel_error(account, &old.gateway_token, Some(&new.gateway_token), &detail)
                .await;
            return Some(old.gateway_token.clone());
        }

        // Already cancelled subscriptions have nothing left to stop
        if !old.is_active() {
            return None;
        }
        if let Err(err) = self.billing.cancel_remote(&old.gateway_token).await {
            tracing::error!(
                account_id = %account.id,
                old_gateway_token = %old.gateway_token,
                new_gateway_token = %new.gateway_token,
                error = %self.redactor.redact(&err.to_string()),
                "old subscription not cancelled, tenant may be billed twice"
            );
            self.alert_cancel_error(account, &old.gateway_token, Some(&new.gateway_token), &err.to_string())
                .await;
            return Some(old.gateway_token.clone());
        }
        None
    }

    /// Turn the account back on once it has a payment on file
    ///
    /// A failed write is logged; the stored payment stands.
    pub(crate) async fn reactivate(&self, account: &mut Account) {
        if account.active {
            return;
        }
        account.active = true;
        match self.accounts.update(account).await {
            Ok(()) => tracing::info!(account_id = %account.id, "account reactivated by new payment"),
            Err(err) => tracing::error!(
                account_id = %account.id,
                error = %err,
                "account not reactivated after new payment"
            ),
        }
    }

    /// Turn a failed `open`/`change` into the caller's outcome
    ///
    /// Response-class failures alert the operators exactly once.
    pub(crate) async fn billing_failure<T>(
        &self,
        err: BillingError,
        account_name: &str,
        account_id: Option<Uuid>,
    ) -> Result<Outcome<T>> {
        match err {
            BillingError::Validation(message) => Ok(Outcome::Invalid(vec![Feedback::invalid(message)])),
            BillingError::Gateway(GatewayError::Request { messages }) => {
                tracing::info!(account_id = ?account_id, "gateway rejected billing data");
                Ok(Outcome::Invalid(Feedback::from_gateway(messages)))
            }
            BillingError::Gateway(err @ GatewayError::Response { .. }) => {
                tracing::error!(
                    account_id = ?account_id,
                    error_code = err.code(),
                    error = %self.redactor.redact(&err.to_string()),
                    "gateway outcome unknown"
                );
                self.alert_create_error(account_name, account_id, &err.to_string())
                    .await;
                Ok(Outcome::ProcessingError)
            }
            BillingError::Store(err) => Err(err.into()),
        }
    }

    pub(crate) async fn alert_create_error(&self, account_name: &str, account_id: Option<Uuid>, error: &str) {
        let context = CreateErrorAlert {
            account_name,
            account_id: account_id.map_or_else(|| "(no account yet)".to_string(), |id| id.to_string()),
            error: self.redactor.redact(error),
        };
        self.send_alert(PAYMENT_CREATE_ERROR, &context).await;
    }

    pub(crate) async fn alert_cancel_error(
        &self,
        account: &Account,
        old_gateway_token: &str,
        new_gateway_token: Option<&str>,
        error: &str,
    ) {
        let context = CancelErrorAlert {
            account_name: &account.name,
            account_id: account.id.to_string(),
            old_gateway_token,
            new_gateway_token,
            error: self.redactor.redact(error),
        };
        self.send_alert(PAYMENT_CANCEL_ERROR, &context).await;
    }

    async fn send_alert<T: Serialize + Sync>(&self, template: &str, context: &T) {
        // The workflow outcome stands even when the alert itself fails
        if let Err(err) = self.email.alert_operators(template, context).await {
            tracing::error!(template = template, error = %err, "operator alert not delivered");
        }
    }
}

/// Ledger failures are storage failures; gateway errors never reach here
pub(crate) fn store_error(err: BillingError) -> crate::error::WorkflowError {
    match err {
        BillingError::Store(err) => err.into(),
        other => error_common::PlatformError::persistence(other.to_string()).into(),
    }
}
