use crate::domain::account::{CustomerAccountSnapshot, PaymentAccountInfo};
use crate::domain::mandate::MandateRecord;
use crate::domain::ports::{CustomerProfileStore, MandateStore, OrderPaymentStore};
use crate::error::{DebitError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for mandate records.
///
/// Records are keyed by order id. The reference index is updated under the
/// same write lock as the records, which makes the uniqueness check atomic.
#[derive(Default, Clone)]
pub struct InMemoryMandateStore {
    inner: Arc<RwLock<MandateTables>>,
}

#[derive(Default)]
struct MandateTables {
    records: HashMap<u64, MandateRecord>,
    references: HashMap<String, u64>,
}

impl InMemoryMandateStore {
    /// Creates a new, empty in-memory mandate store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MandateStore for InMemoryMandateStore {
    async fn insert(&self, record: MandateRecord) -> Result<()> {
        let mut tables = self.inner.write().await;
        if tables.records.contains_key(&record.order_id) {
            return Err(DebitError::MandateExists(record.order_id));
        }
        if tables.references.contains_key(&record.mandate_reference) {
            return Err(DebitError::DuplicateReference(record.mandate_reference));
        }
        tables
            .references
            .insert(record.mandate_reference.clone(), record.order_id);
        tables.records.insert(record.order_id, record);
        Ok(())
    }

    async fn update(&self, record: MandateRecord) -> Result<()> {
        let mut tables = self.inner.write().await;
        if !tables.records.contains_key(&record.order_id) {
            return Err(DebitError::MandateNotFound(record.order_id));
        }
        tables.records.insert(record.order_id, record);
        Ok(())
    }

    async fn get(&self, order_id: u64) -> Result<Option<MandateRecord>> {
        let tables = self.inner.read().await;
        Ok(tables.records.get(&order_id).cloned())
    }

    async fn pending(&self) -> Result<Vec<MandateRecord>> {
        let tables = self.inner.read().await;
        let mut pending: Vec<MandateRecord> = tables
            .records
            .values()
            .filter(|r| !r.is_generated)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.order_id);
        Ok(pending)
    }
}

/// A thread-safe in-memory store for customer account snapshots.
#[derive(Default, Clone)]
pub struct InMemoryCustomerProfileStore {
    snapshots: Arc<RwLock<HashMap<u64, CustomerAccountSnapshot>>>,
}

impl InMemoryCustomerProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerProfileStore for InMemoryCustomerProfileStore {
    async fn save_snapshot(&self, snapshot: CustomerAccountSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.customer_id, snapshot);
        Ok(())
    }

    async fn get_snapshot(&self, customer_id: u64) -> Result<Option<CustomerAccountSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&customer_id).cloned())
    }
}

/// A thread-safe in-memory store for the account data of order payments.
#[derive(Default, Clone)]
pub struct InMemoryOrderPaymentStore {
    payments: Arc<RwLock<HashMap<u64, PaymentAccountInfo>>>,
}

impl InMemoryOrderPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderPaymentStore for InMemoryOrderPaymentStore {
    async fn store(&self, order_id: u64, info: PaymentAccountInfo) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(order_id, info);
        Ok(())
    }

    async fn get(&self, order_id: u64) -> Result<Option<PaymentAccountInfo>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(order_id: u64, reference: &str) -> MandateRecord {
        MandateRecord {
            order_id,
            website_id: 1,
            store_id: 1,
            increment_id: format!("10000000{}", order_id),
            mandate_reference: reference.to_string(),
            mandate_city: "Berlin".to_string(),
            is_generated: false,
        }
    }

    #[tokio::test]
    async fn test_in_memory_mandate_store() {
        let store = InMemoryMandateStore::new();
        store.insert(record(1, "REF1")).await.unwrap();

        let retrieved = store.get(1).await.unwrap().unwrap();
        assert_eq!(retrieved, record(1, "REF1"));
        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let store = InMemoryMandateStore::new();
        store.insert(record(1, "REF1")).await.unwrap();

        let result = store.insert(record(2, "REF1")).await;
        assert!(matches!(result, Err(DebitError::DuplicateReference(_))));
        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_existing_order_is_not_overwritten() {
        let store = InMemoryMandateStore::new();
        let mut generated = record(1, "REF1");
        generated.is_generated = true;
        store.insert(record(1, "REF1")).await.unwrap();
        store.update(generated.clone()).await.unwrap();

        let result = store.insert(record(1, "REF2")).await;
        assert!(matches!(result, Err(DebitError::MandateExists(1))));
        assert_eq!(store.get(1).await.unwrap(), Some(generated));

        // The rejected reference stays free
        store.insert(record(2, "REF2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_pending_excludes_generated() {
        let store = InMemoryMandateStore::new();
        store.insert(record(2, "REF2")).await.unwrap();
        store.insert(record(1, "REF1")).await.unwrap();

        let mut generated = record(2, "REF2");
        generated.is_generated = true;
        store.update(generated).await.unwrap();

        let pending = store.pending().await.unwrap();
        assert_eq!(pending, vec![record(1, "REF1")]);
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let store = InMemoryMandateStore::new();
        let result = store.update(record(9, "REF9")).await;
        assert!(matches!(result, Err(DebitError::MandateNotFound(9))));
    }

    #[tokio::test]
    async fn test_snapshot_last_write_wins() {
        let store = InMemoryCustomerProfileStore::new();
        for owner in ["Erika Mustermann", "Max Mustermann"] {
            let snapshot = CustomerAccountSnapshot {
                customer_id: 5,
                updated_at: Utc::now(),
                account: PaymentAccountInfo {
                    owner_name: owner.to_string(),
                    ..PaymentAccountInfo::default()
                },
            };
            store.save_snapshot(snapshot).await.unwrap();
        }

        let snapshot = store.get_snapshot(5).await.unwrap().unwrap();
        assert_eq!(snapshot.account.owner_name, "Max Mustermann");
    }

    #[tokio::test]
    async fn test_in_memory_order_payment_store() {
        let store = InMemoryOrderPaymentStore::new();
        let info = PaymentAccountInfo {
            owner_name: "Erika Mustermann".to_string(),
            ..PaymentAccountInfo::default()
        };
        store.store(3, info.clone()).await.unwrap();
        assert_eq!(store.get(3).await.unwrap(), Some(info));
        assert!(store.get(4).await.unwrap().is_none());
    }
}
