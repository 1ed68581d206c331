//! Shared fixture: in-memory stores, a scripted gateway and a mail outbox
#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use auth_identity::repository::*;
use auth_identity::*;
use billing_service::*;
use chrono::{NaiveDate, Utc};
use config_engine::{MailSettings, PlatformConfig, ResourceLimit, SubscriptionCatalog, SubscriptionLevel};
use email_service::*;
use error_common::{PlatformError, Result as StoreResult};
use mockall::mock;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use workflow_engine::SubscriptionWorkflow;

pub const OPERATOR: &str = "ops@example.com";
pub const FREE: usize = 0;
pub const SILVER: usize = 1;
pub const GOLD: usize = 2;

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn start(&self, request: &StartSubscription) -> GatewayResult<String>;
        async fn change(&self, gateway_token: &str, amount: Decimal) -> GatewayResult<()>;
        async fn cancel(&self, gateway_token: &str) -> GatewayResult<()>;
    }
}

/// Ordered record of gateway calls and ledger writes
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Payment ledger that records writes into [`Events`]; writes can be made to fail
pub struct RecordingPayments {
    inner: Arc<InMemoryPaymentRepository>,
    events: Events,
    pub fail_inserts: AtomicBool,
    pub fail_deletes: AtomicBool,
}

#[async_trait]
impl PaymentRepository for RecordingPayments {
    async fn insert(&self, payment: &RecurringPayment) -> StoreResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PlatformError::persistence("disk full"));
        }
        self.events.push(format!("insert {}", payment.gateway_token));
        self.inner.insert(payment).await
    }

    async fn update(&self, payment: &RecurringPayment) -> StoreResult<()> {
        self.inner.update(payment).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<RecurringPayment>> {
        self.inner.find_by_id(id).await
    }

    async fn find_for_account(&self, account_id: Uuid) -> StoreResult<Option<RecurringPayment>> {
        self.inner.find_for_account(account_id).await
    }

    async fn list_for_account(&self, account_id: Uuid) -> StoreResult<Vec<RecurringPayment>> {
        self.inner.list_for_account(account_id).await
    }

    async fn list(&self) -> StoreResult<Vec<RecurringPayment>> {
        self.inner.list().await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PlatformError::persistence("disk full"));
        }
        if let Some(payment) = self.inner.find_by_id(id).await? {
            self.events.push(format!("delete {}", payment.gateway_token));
        }
        self.inner.delete(id).await
    }
}

/// Account store whose inserts can be made to fail
pub struct FlakyAccounts {
    pub inner: Arc<InMemoryAccountRepository>,
    pub fail_inserts: AtomicBool,
}

#[async_trait]
impl AccountRepository for FlakyAccounts {
    async fn insert(&self, account: &Account) -> StoreResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PlatformError::persistence("disk full"));
        }
        self.inner.insert(account).await
    }

    async fn update(&self, account: &Account) -> StoreResult<()> {
        self.inner.update(account).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_host(&self, subdomain: &str, domain: &str) -> StoreResult<Option<Account>> {
        self.inner.find_by_host(subdomain, domain).await
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        self.inner.list().await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete(id).await
    }
}

pub fn catalog() -> SubscriptionCatalog {
    let level = |handle: &str, price: i64, trial_periods: u32, people: ResourceLimit| SubscriptionLevel {
        handle: handle.to_string(),
        name: handle.to_string(),
        description: String::new(),
        price: Decimal::new(price, 0),
        period: 1,
        trial_periods,
        resources: [("people".to_string(), people)].into(),
    };
    SubscriptionCatalog::new(vec![
        level("free", 0, 0, ResourceLimit::Limited(3)),
        level("silver", 100, 1, ResourceLimit::Limited(10)),
        level("gold", 200, 0, ResourceLimit::Unlimited),
    ])
}

pub fn config() -> PlatformConfig {
    PlatformConfig {
        domains: vec!["example.com".to_string()],
        mail: MailSettings {
            from_address: "billing@example.com".to_string(),
            operators: vec![OPERATOR.to_string()],
        },
        subscription_levels: catalog(),
        ..PlatformConfig::default()
    }
}

pub struct Harness {
    pub workflow: SubscriptionWorkflow,
    pub accounts: Arc<FlakyAccounts>,
    pub people: Arc<InMemoryPersonRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub ledger: Arc<RecordingPayments>,
    pub identity: Arc<IdentityService>,
    pub outbox: Arc<InMemoryOutbox>,
    pub events: Events,
}

impl Harness {
    pub fn new(gateway: MockGateway, events: Events) -> Self {
        let config = Arc::new(config());
        let accounts = Arc::new(FlakyAccounts {
            inner: Arc::new(InMemoryAccountRepository::new()),
            fail_inserts: AtomicBool::new(false),
        });
        let people = Arc::new(InMemoryPersonRepository::new());
        let identity = Arc::new(IdentityService::new(
            accounts.clone(),
            people.clone(),
            Arc::new(InMemoryGroupRepository::new()),
            Arc::new(InMemoryRoleRepository::with_roles([ACCOUNT_ADMIN_ROLE])),
            IdentityConfig::default(),
        ));

        let payments = Arc::new(InMemoryPaymentRepository::new());
        let ledger = Arc::new(RecordingPayments {
            inner: payments.clone(),
            events: events.clone(),
            fail_inserts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        });
        let billing = Arc::new(BillingService::new(Arc::new(gateway), ledger.clone()));

        let outbox = Arc::new(InMemoryOutbox::new());
        let email = Arc::new(EmailService::new(
            TemplateRenderer::new().unwrap(),
            outbox.clone(),
            Arc::new(MailNotifier::new(outbox.clone(), config.mail.clone())),
            config.mail.from_address.clone(),
        ));

        let workflow = SubscriptionWorkflow::new(
            config,
            accounts.clone(),
            people.clone(),
            identity.clone(),
            billing,
            email,
        );

        Self {
            workflow,
            accounts,
            people,
            payments,
            ledger,
            identity,
            outbox,
            events,
        }
    }

    pub async fn seed_account(&self, subdomain: &str, level: usize) -> Account {
        let account = Account::new(subdomain, "example.com", format!("{subdomain} inc"), level);
        self.accounts.inner.insert(&account).await.unwrap();
        account
    }

    /// Store a payment directly, bypassing the gateway and the event log
    pub async fn seed_payment(&self, account: &Account, gateway_token: &str, amount: i64) -> RecurringPayment {
        let payment = RecurringPayment {
            id: Uuid::new_v4(),
            account_id: account.id,
            name: "Old Card".to_string(),
            number: "************0027".to_string(),
            amount: Decimal::new(amount, 0),
            period: 1,
            token: account.id.to_string(),
            gateway_token: gateway_token.to_string(),
            active_on: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
            cancelled_at: None,
            created_on: Utc::now().date_naive(),
        };
        self.payments.insert(&payment).await.unwrap();
        payment
    }

    pub async fn account(&self, id: Uuid) -> Account {
        self.accounts.inner.find_by_id(id).await.unwrap().unwrap()
    }

    pub async fn current_payment(&self, account_id: Uuid) -> Option<RecurringPayment> {
        self.payments.find_for_account(account_id).await.unwrap()
    }

    pub async fn alerts(&self) -> Vec<EmailMessage> {
        self.outbox.sent_to(OPERATOR).await
    }

    /// The single operator alert sent so far
    pub async fn only_alert(&self) -> EmailMessage {
        let mut alerts = self.alerts().await;
        assert_eq!(alerts.len(), 1, "expected exactly one alert");
        alerts.remove(0)
    }
}

pub fn card() -> CardDetails {
    CardDetails {
        first_name: "Test".to_string(),
        last_name: "Testerson".to_string(),
        number: "4111111111111111".to_string(),
        expires: CardExpiry::new(2030, 8),
    }
}

pub fn request_error() -> GatewayError {
    GatewayError::Request {
        messages: vec![GatewayMessage::new("E00013", "Card number is invalid.")],
    }
}

pub fn response_error() -> GatewayError {
    GatewayError::response("<html>502 Bad Gateway</html>")
}
