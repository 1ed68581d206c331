use crate::models::RecurringPayment;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use error_common::{PlatformError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Storage for recurring payments
///
/// A tenant has one logical payment slot. During a replacement two records
/// may briefly coexist; the most recently inserted one is current.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &RecurringPayment) -> Result<()>;
    async fn update(&self, payment: &RecurringPayment) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringPayment>>;
    /// Current payment of the account
    async fn find_for_account(&self, account_id: Uuid) -> Result<Option<RecurringPayment>>;
    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<RecurringPayment>>;
    async fn list(&self) -> Result<Vec<RecurringPayment>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// In-memory payment repository for testing and development
pub struct InMemoryPaymentRepository {
    payments: Arc<DashMap<Uuid, (u64, RecurringPayment)>>,
    sequence: AtomicU64,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self {
            payments: Arc::new(DashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn sorted(&self, account_id: Option<Uuid>) -> Vec<RecurringPayment> {
        let mut rows: Vec<(u64, RecurringPayment)> = self
            .payments
            .iter()
            .filter(|entry| account_id.map_or(true, |id| entry.value().1.account_id == id))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(sequence, _)| *sequence);
        rows.into_iter().map(|(_, payment)| payment).collect()
    }
}

impl Default for InMemoryPaymentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &RecurringPayment) -> Result<()> {
        match self.payments.entry(payment.id) {
            Entry::Occupied(_) => Err(PlatformError::conflict(format!(
                "payment {} already exists",
                payment.id
            ))),
            Entry::Vacant(slot) => {
                let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
                slot.insert((sequence, payment.clone()));
                Ok(())
            }
        }
    }

    async fn update(&self, payment: &RecurringPayment) -> Result<()> {
        let mut entry = self
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| PlatformError::not_found(format!("payment {}", payment.id)))?;
        entry.value_mut().1 = payment.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringPayment>> {
        Ok(self.payments.get(&id).map(|entry| entry.value().1.clone()))
    }

    async fn find_for_account(&self, account_id: Uuid) -> Result<Option<RecurringPayment>> {
        Ok(self.sorted(Some(account_id)).pop())
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<RecurringPayment>> {
        Ok(self.sorted(Some(account_id)))
    }

    async fn list(&self) -> Result<Vec<RecurringPayment>> {
        Ok(self.sorted(None))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.payments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PlatformError::not_found(format!("payment {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn payment(account_id: Uuid, gateway_token: &str) -> RecurringPayment {
        let today = Utc::now().date_naive();
        RecurringPayment {
            id: Uuid::new_v4(),
            account_id,
            name: "Test Testerson".to_string(),
            number: "************1111".to_string(),
            amount: Decimal::new(100, 0),
            period: 1,
            token: account_id.to_string(),
            gateway_token: gateway_token.to_string(),
            active_on: NaiveDate::from_ymd_opt(2007, 3, 19).unwrap_or(today),
            cancelled_at: None,
            created_on: today,
        }
    }

    #[tokio::test]
    async fn test_newest_payment_is_current() {
        let repo = InMemoryPaymentRepository::new();
        let account_id = Uuid::new_v4();
        let old = payment(account_id, "old");
        let new = payment(account_id, "new");

        repo.insert(&old).await.unwrap();
        repo.insert(&new).await.unwrap();
        repo.insert(&payment(Uuid::new_v4(), "other")).await.unwrap();

        let current = repo.find_for_account(account_id).await.unwrap().unwrap();
        assert_eq!(current.gateway_token, "new");
        assert_eq!(repo.list_for_account(account_id).await.unwrap().len(), 2);

        repo.delete(new.id).await.unwrap();
        let current = repo.find_for_account(account_id).await.unwrap().unwrap();
        assert_eq!(current.gateway_token, "old");
    }

    #[tokio::test]
    async fn test_update_and_missing_rows() {
        let repo = InMemoryPaymentRepository::new();
        let mut row = payment(Uuid::new_v4(), "tok");

        assert!(repo.update(&row).await.unwrap_err().is_not_found());
        repo.insert(&row).await.unwrap();
        assert!(repo.insert(&row).await.unwrap_err().is_conflict());

        row.amount = Decimal::new(200, 0);
        repo.update(&row).await.unwrap();
        assert_eq!(
            repo.find_by_id(row.id).await.unwrap().unwrap().amount,
            Decimal::new(200, 0)
        );

        repo.delete(row.id).await.unwrap();
        assert!(repo.delete(row.id).await.unwrap_err().is_not_found());
        assert!(repo.find_for_account(row.account_id).await.unwrap().is_none());
    }
}
