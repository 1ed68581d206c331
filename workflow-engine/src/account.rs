use crate::error::Result;
use crate::outcome::Outcome;
use crate::workflow::{store_error, SubscriptionWorkflow};
use auth_identity::Account;
use chrono::{DateTime, Utc};
use email_service::PASSWORD_RESET;
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
struct PasswordResetMail<'a> {
    first_name: &'a str,
    username: &'a str,
    domain: String,
    password: &'a str,
}

impl SubscriptionWorkflow {
    /// Turn a deactivated free account back on
    pub async fn reactivate_free_account(&self, account_id: Uuid) -> Result<Outcome<Account>> {
        let _guard = self.locks.acquire(account_id).await;

        let Some(mut account) = self.load_account(account_id).await? else {
            return Ok(Outcome::NotFound);
        };
        if account.requires_payment(&self.config.subscription_levels) {
            return Ok(Outcome::Redirect(self.config.paths.change_payment_method.clone()));
        }

        if !account.active {
            account.active = true;
            self.accounts.update(&account).await?;
            tracing::info!(account_id = %account.id, "free account reactivated");
        }
        Ok(Outcome::Done(account))
    }

    /// Deactivate every account whose cancelled payment ran out before `at`
    ///
    /// Returns the ids of the accounts deactivated by this sweep.
    pub async fn expire_lapsed_accounts(&self, at: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let payments = self.billing.payments().list().await?;
        let mut deactivated = Vec::new();

        for payment in payments.iter().filter(|payment| payment.is_expired(at)) {
            let _guard = self.locks.acquire(payment.account_id).await;

            // A replacement may have been stored since the listing
            let current = self
                .billing
                .current(payment.account_id)
                .await
                .map_err(store_error)?;
            if current.as_ref().map(|current| current.id) != Some(payment.id) {
                continue;
            }

            let Some(mut account) = self.load_account(payment.account_id).await? else {
                continue;
            };
            if account.active {
                account.active = false;
                self.accounts.update(&account).await?;
                tracing::info!(
                    account_id = %account.id,
                    gateway_token = %payment.gateway_token,
                    "account deactivated after final payment"
                );
                deactivated.push(account.id);
            }
        }

        Ok(deactivated)
    }

    /// Give a person a fresh random password and mail it to them
    pub async fn reset_password(&self, account_id: Uuid, username: &str) -> Result<Outcome<()>> {
        let Some(account) = self.load_account(account_id).await? else {
            return Ok(Outcome::NotFound);
        };
        let Some(person) = self.people.find_by_username(account.id, username).await? else {
            return Ok(Outcome::NotFound);
        };

        let (person, password) = self.identity.reset_password(person.id).await?;
        let mail = PasswordResetMail {
            first_name: &person.first_name,
            username: &person.username,
            domain: account.full_domain(),
            password: &password,
        };
        self.email
            .send_template(&person.email, PASSWORD_RESET, &mail)
            .await?;

        Ok(Outcome::Done(()))
    }
}
