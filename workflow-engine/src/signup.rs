use crate::error::{Result, WorkflowError};
use crate::outcome::{Feedback, Outcome};
use crate::workflow::{store_error, SubscriptionWorkflow};
use auth_identity::{Account, IdentityError, NewPerson, Person, ACCOUNT_ADMIN_ROLE};
use billing_service::{CardDetails, RecurringPayment};
use error_common::PlatformError;
use serde::Deserialize;

/// Everything needed to open a new tenant
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Index into the subscription catalogue
    pub level: usize,
    pub subdomain: String,
    pub domain: String,
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
    pub admin: NewPerson,
    /// Required when the level has a price
    #[serde(default)]
    pub card: Option<CardDetails>,
}

/// What a successful signup created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupReceipt {
    pub account: Account,
    pub admin: Person,
    pub payment: Option<RecurringPayment>,
    /// Where to send the new admin
    pub redirect: String,
}

fn valid_subdomain(subdomain: &str) -> bool {
    !subdomain.is_empty()
        && !subdomain.starts_with('-')
        && !subdomain.ends_with('-')
        && subdomain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl SubscriptionWorkflow {
    /// Create an account, its administrator and, for priced levels, the
    /// recurring payment
    ///
    /// All local validation happens before the gateway is called. A local
    /// failure after the subscription was started cancels it again and
    /// alerts the operators.
    pub async fn signup(&self, request: SignupRequest) -> Result<Outcome<SignupReceipt>> {
        let Some(level) = self.config.subscription_levels.get(request.level).cloned() else {
            return Ok(Outcome::NotFound);
        };

        let subdomain = request.subdomain.trim().to_lowercase();
        let domain = request.domain.trim().to_lowercase();
        let mut feedback = Vec::new();
        if !valid_subdomain(&subdomain) {
            feedback.push(Feedback::invalid(
                "subdomain may only contain letters, digits and inner hyphens",
            ));
        }
        if !self.config.is_allowed_domain(&domain) {
            feedback.push(Feedback::invalid(format!("{domain} is not an available domain")));
        }
        if request.name.trim().is_empty() {
            feedback.push(Feedback::missing("account name"));
        }
        if !level.is_free() && request.card.is_none() {
            feedback.push(Feedback::missing("billing information"));
        }
        if !feedback.is_empty() {
            return Ok(Outcome::Invalid(feedback));
        }

        if self.accounts.find_by_host(&subdomain, &domain).await?.is_some() {
            return Ok(Outcome::Invalid(vec![Feedback::duplicate(format!(
                "{subdomain}.{domain} is already taken"
            ))]));
        }

        let mut account = Account::new(subdomain, domain, request.name.trim(), request.level);
        if let Some(timezone) = request.timezone.filter(|tz| !tz.trim().is_empty()) {
            account.timezone = timezone;
        }

        let mut admin = match self.identity.prepare_person(account.id, request.admin) {
            Ok(person) => person,
            Err(IdentityError::WeakPassword) => {
                return Ok(Outcome::Invalid(vec![Feedback::invalid("password is too short")]))
            }
            Err(err) => return Err(err.into()),
        };
        admin.roles.insert(ACCOUNT_ADMIN_ROLE.to_string());

        let payment = match &request.card {
            Some(card) if !level.is_free() => {
                match self.billing.open(account.id, &level, card, None).await {
                    Ok(payment) => Some(payment),
                    Err(err) => return self.billing_failure(err, &account.name, None).await,
                }
            }
            _ => None,
        };

        if let Err(err) = self.persist_signup(&account, &admin, payment.as_ref()).await {
            return self.undo_signup(&account, payment.as_ref(), err).await;
        }

        tracing::info!(
            account_id = %account.id,
            host = %account.full_domain(),
            level = %level.handle,
            "account created"
        );
        let redirect = format!("http://{}/", account.full_domain());
        Ok(Outcome::Done(SignupReceipt {
            account,
            admin,
            payment,
            redirect,
        }))
    }

    async fn persist_signup(
        &self,
        account: &Account,
        admin: &Person,
        payment: Option<&RecurringPayment>,
    ) -> Result<()> {
        self.accounts.insert(account).await?;
        if let Err(err) = self.people.insert(admin).await {
            self.remove_account(account).await;
            return Err(err.into());
        }
        if let Some(payment) = payment {
            if let Err(err) = self.billing.save(payment).await {
                self.remove_person(admin).await;
                self.remove_account(account).await;
                return Err(store_error(err));
            }
        }
        Ok(())
    }

    /// Roll back a signup whose local commit failed
    async fn undo_signup(
        &self,
        account: &Account,
        payment: Option<&RecurringPayment>,
        err: WorkflowError,
    ) -> Result<Outcome<SignupReceipt>> {
        tracing::warn!(account_id = %account.id, error = %err, "signup commit failed, compensating");

        if let Some(payment) = payment {
            let cancelled = self.billing.cancel_remote(&payment.gateway_token).await;
            let detail = match &cancelled {
                Ok(()) => format!("{err}; subscription {} was cancelled", payment.gateway_token),
                Err(cancel_err) => format!(
                    "{err}; subscription {} could NOT be cancelled: {cancel_err}",
                    payment.gateway_token
                ),
            };
            self.alert_create_error(&account.name, Some(account.id), &detail)
                .await;
        }

        match err {
            WorkflowError::Store(PlatformError::Conflict(message)) => {
                Ok(Outcome::Invalid(vec![Feedback::duplicate(message)]))
            }
            _ if payment.is_some() => Ok(Outcome::ProcessingError),
            other => Err(other),
        }
    }

    async fn remove_account(&self, account: &Account) {
        if let Err(err) = self.accounts.delete(account.id).await {
            tracing::error!(account_id = %account.id, error = %err, "could not remove account");
        }
    }

    async fn remove_person(&self, person: &Person) {
        if let Err(err) = self.people.delete(person.id).await {
            tracing::error!(person_id = %person.id, error = %err, "could not remove person");
        }
    }
}
