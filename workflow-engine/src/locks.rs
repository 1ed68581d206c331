use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = DashMap<Uuid, Arc<Mutex<()>>>;

/// One async mutex per tenant around payment-mutating workflows
///
/// Entries live only while someone holds or waits for them.
#[derive(Default)]
pub struct TenantLocks {
    locks: Arc<LockTable>,
}

/// Exclusive access to one tenant's payment slot, released on drop
pub struct TenantGuard {
    account_id: Uuid,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the tenant's payment slot
    pub async fn acquire(&self, account_id: Uuid) -> TenantGuard {
        // Clone out of the map so the shard lock is not held across the await
        let lock = self
            .locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        TenantGuard {
            account_id,
            table: self.locks.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Tenants with a lock currently held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for TenantGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table's own reference left means nobody holds or waits
        self.table
            .remove_if(&self.account_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tenant_is_serialised() {
        let locks = Arc::new(TenantLocks::new());
        let tenant = Uuid::new_v4();

        let guard = locks.acquire(tenant).await;
        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(tenant).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_tenants_do_not_wait() {
        let locks = TenantLocks::new();
        let _first = locks.acquire(Uuid::new_v4()).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_table_empties_after_release() {
        let locks = Arc::new(TenantLocks::new());
        let tenant = Uuid::new_v4();

        let first = locks.acquire(tenant).await;
        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(tenant).await;
            })
        };
        let other = locks.acquire(Uuid::new_v4()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(locks.len(), 2);

        // The waiter still references the lock, so the entry survives
        drop(first);
        waiting.await.unwrap();
        assert_eq!(locks.len(), 1);

        drop(other);
        assert!(locks.is_empty());
    }
}
