use crate::error::Result;
use crate::outcome::{Feedback, Outcome};
use crate::workflow::{store_error, SubscriptionWorkflow};
use auth_identity::Account;
use billing_service::CardDetails;
use uuid::Uuid;

impl SubscriptionWorkflow {
    /// Whether an upgrade of this account needs fresh card data
    ///
    /// Only an existing, still active payment can be carried over.
    pub async fn upgrade_requires_card(&self, account_id: Uuid) -> Result<bool> {
        let payment = self.billing.current(account_id).await.map_err(store_error)?;
        Ok(!payment.is_some_and(|payment| payment.is_active()))
    }

    /// Move a tenant to another priced level
    ///
    /// An active payment is re-priced in place. Without one a new
    /// subscription is started from `card` and replaces the old record.
    pub async fn upgrade(
        &self,
        account_id: Uuid,
        level_id: usize,
        card: Option<&CardDetails>,
    ) -> Result<Outcome<Account>> {
        let _guard = self.locks.acquire(account_id).await;

        let Some(mut account) = self.load_account(account_id).await? else {
            return Ok(Outcome::NotFound);
        };
        let Some(level) = self.config.subscription_levels.get(level_id).cloned() else {
            return Ok(Outcome::NotFound);
        };
        // Moving to a free level means cancelling, which is its own flow
        if level.is_free() || account.subscription_level_id == level_id {
            tracing::debug!(account_id = %account.id, level = %level.handle, "upgrade refused");
            return Ok(Outcome::Forbidden);
        }

        let current = self.billing.current(account.id).await.map_err(store_error)?;
        match current {
            Some(mut payment) if payment.is_active() => {
                if let Err(err) = self.billing.change_amount(&mut payment, level.price).await {
                    return self.billing_failure(err, &account.name, Some(account.id)).await;
                }
            }
            previous => {
                let Some(card) = card else {
                    return Ok(Outcome::Invalid(vec![Feedback::missing("billing information")]));
                };
                let replacement = match self.billing.open(account.id, &level, card, None).await {
                    Ok(payment) => payment,
                    Err(err) => {
                        return self.billing_failure(err, &account.name, Some(account.id)).await
                    }
                };
                if !self.store_started(&account, &replacement).await {
                    return Ok(Outcome::ProcessingError);
                }
                account.active = true;
                if let Some(previous) = previous {
                    // Only cancelled payments reach this arm
                    self.retire_payment(&account, &previous, &replacement).await;
                }
            }
        }

        account.subscription_level_id = level_id;
        self.accounts.update(&account).await?;

        tracing::info!(account_id = %account.id, level = %level.handle, "subscription level changed");
        Ok(Outcome::Done(account))
    }
}
